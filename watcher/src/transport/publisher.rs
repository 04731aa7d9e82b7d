//! TCP publisher client.
//!
//! Used by workers (and the `logwatch publish` command) to send log records
//! to an aggregator.

use crate::error::TransportError;
use futures::SinkExt;
use shared::endpoint::Endpoint;
use shared::models::{RawLogMessage, Severity};
use shared::wire::MultipartCodec;
use tokio::net::TcpStream;
use tokio_util::codec::FramedWrite;

/// A connection to an aggregator endpoint.
#[derive(Debug)]
pub struct TcpPublisher {
    frames: FramedWrite<TcpStream, MultipartCodec>,
}

impl TcpPublisher {
    /// Connects to an aggregator.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(endpoint.address())
            .await
            .map_err(|source| TransportError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;

        Ok(Self {
            frames: FramedWrite::new(stream, MultipartCodec::new()),
        })
    }

    /// Sends a raw multipart message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be encoded or written.
    pub async fn send(&mut self, message: RawLogMessage) -> Result<(), TransportError> {
        self.frames.send(message).await?;
        Ok(())
    }

    /// Sends a log record as `<prefix>.<LEVEL>` with a newline-terminated body.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be written.
    pub async fn send_log(
        &mut self,
        prefix: &str,
        level: Severity,
        text: &str,
    ) -> Result<(), TransportError> {
        self.send(log_message(prefix, level, text)).await
    }

    /// Flushes and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered data cannot be written.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.frames.close().await?;
        Ok(())
    }
}

/// Builds the two-part message a log-publishing handler would emit.
pub(crate) fn log_message(prefix: &str, level: Severity, text: &str) -> RawLogMessage {
    let topic = if prefix.is_empty() {
        level.to_string()
    } else {
        format!("{prefix}.{level}")
    };
    RawLogMessage::log(topic, format!("{text}\n"))
}
