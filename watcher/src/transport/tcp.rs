//! TCP subscriber transport.
//!
//! Publishers connect to the bound endpoint and write multipart messages
//! framed by [`MultipartCodec`]. Filtering happens on the subscriber side.

use super::subscriptions::{deliver, Subscriptions};
use super::{Inbox, SubSocket, TransportContext, DEFAULT_QUEUE_CAPACITY};
use crate::error::TransportError;
use futures::StreamExt;
use shared::endpoint::Endpoint;
use shared::models::RawLogMessage;
use shared::wire::MultipartCodec;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Creates TCP subscriber sockets.
#[derive(Debug, Clone)]
pub struct TcpContext {
    queue_capacity: usize,
    codec: MultipartCodec,
}

impl TcpContext {
    /// Creates a context with default queue capacity and message size limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            codec: MultipartCodec::new(),
        }
    }

    /// Sets how many messages may wait for the consumer before new ones are dropped.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Sets the largest accepted message size in bytes.
    #[must_use]
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.codec = self.codec.with_max_message_size(size);
        self
    }
}

impl Default for TcpContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportContext for TcpContext {
    type Socket = TcpSubSocket;

    fn socket(&self) -> TcpSubSocket {
        TcpSubSocket {
            subscriptions: Subscriptions::new(),
            queue_capacity: self.queue_capacity,
            codec: self.codec.clone(),
            local_addr: None,
            shutdown: CancellationToken::new(),
        }
    }
}

/// A TCP subscriber socket.
///
/// Dropping the socket stops accepting publishers and closes every
/// publisher connection.
#[derive(Debug)]
pub struct TcpSubSocket {
    subscriptions: Subscriptions,
    queue_capacity: usize,
    codec: MultipartCodec,
    local_addr: Option<SocketAddr>,
    shutdown: CancellationToken,
}

impl TcpSubSocket {
    /// Returns the bound address, with the actual port when bound to port 0.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl SubSocket for TcpSubSocket {
    async fn bind(&mut self, endpoint: &Endpoint) -> Result<Inbox, TransportError> {
        if let Some(addr) = self.local_addr {
            return Err(TransportError::AlreadyBound(addr.to_string()));
        }

        let bind_error = |source| TransportError::Bind {
            endpoint: endpoint.to_string(),
            source,
        };
        let listener = TcpListener::bind(endpoint.address())
            .await
            .map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        tokio::spawn(accept_publishers(
            listener,
            tx,
            self.subscriptions.clone(),
            self.codec.clone(),
            self.shutdown.clone(),
        ));

        info!(%endpoint, %local_addr, "Listening for log publishers");
        self.local_addr = Some(local_addr);
        Ok(rx)
    }

    fn subscribe(&self, filter: &str) -> Result<(), TransportError> {
        self.subscriptions.subscribe(filter);
        Ok(())
    }

    fn unsubscribe(&self, filter: &str) -> Result<(), TransportError> {
        self.subscriptions.unsubscribe(filter);
        Ok(())
    }

    fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.snapshot()
    }
}

impl Drop for TcpSubSocket {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn accept_publishers(
    listener: TcpListener,
    inbox: mpsc::Sender<RawLogMessage>,
    subscriptions: Subscriptions,
    codec: MultipartCodec,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "Publisher connected");
                    tokio::spawn(read_publisher(
                        stream,
                        peer,
                        inbox.clone(),
                        subscriptions.clone(),
                        codec.clone(),
                        shutdown.clone(),
                    ));
                }
                Err(e) => warn!(error = %e, "Failed to accept publisher connection"),
            },
        }
    }
    debug!("Stopped accepting publishers");
}

async fn read_publisher(
    stream: TcpStream,
    peer: SocketAddr,
    inbox: mpsc::Sender<RawLogMessage>,
    subscriptions: Subscriptions,
    codec: MultipartCodec,
    shutdown: CancellationToken,
) {
    let mut frames = FramedRead::new(stream, codec);
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            next = frames.next() => match next {
                Some(Ok(message)) => {
                    deliver(&inbox, &subscriptions, message);
                }
                Some(Err(e)) => {
                    warn!(%peer, error = %e, "Closing publisher connection after framing error");
                    break;
                }
                None => {
                    debug!(%peer, "Publisher disconnected");
                    break;
                }
            },
        }
    }
}
