//! In-process transport.
//!
//! Sockets bind to endpoints registered inside a [`MemoryContext`]; anything
//! holding a clone of the context can publish to them. Every socket keeps a
//! log of the operations issued against it so callers can audit exactly
//! which subscribe and unsubscribe calls were made.

use super::subscriptions::{deliver, Subscriptions};
use super::{Inbox, SubSocket, TransportContext, DEFAULT_QUEUE_CAPACITY};
use crate::error::TransportError;
use shared::endpoint::Endpoint;
use shared::models::RawLogMessage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;

/// An operation issued against a [`MemorySubSocket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketOp {
    /// The socket was bound.
    Bind(Endpoint),
    /// A subscription was added.
    Subscribe(String),
    /// A subscription was removed.
    Unsubscribe(String),
}

#[derive(Debug)]
struct Registration {
    inbox: mpsc::Sender<RawLogMessage>,
    subscriptions: Subscriptions,
}

/// In-process transport context.
///
/// Clones share the same endpoint registry.
#[derive(Debug, Clone)]
pub struct MemoryContext {
    endpoints: Arc<Mutex<HashMap<Endpoint, Registration>>>,
    queue_capacity: usize,
}

impl MemoryContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: Arc::new(Mutex::new(HashMap::new())),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Sets the inbox capacity of sockets created afterwards.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Publishes a message to whatever socket is bound at `endpoint`.
    ///
    /// Returns true if the message was queued. Messages are discarded when
    /// nothing is bound, the topic is not subscribed, or the inbox is full.
    pub fn publish(&self, endpoint: &Endpoint, message: RawLogMessage) -> bool {
        let endpoints = self.endpoints.lock().unwrap_or_else(PoisonError::into_inner);
        match endpoints.get(endpoint) {
            Some(registration) => deliver(&registration.inbox, &registration.subscriptions, message),
            None => false,
        }
    }

    /// Returns true if a socket is bound at `endpoint`.
    #[must_use]
    pub fn is_bound(&self, endpoint: &Endpoint) -> bool {
        self.endpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(endpoint)
    }
}

impl Default for MemoryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportContext for MemoryContext {
    type Socket = MemorySubSocket;

    fn socket(&self) -> MemorySubSocket {
        MemorySubSocket {
            context: self.clone(),
            subscriptions: Subscriptions::new(),
            endpoint: None,
            ops: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

/// An in-process subscriber socket.
///
/// Dropping the socket releases its endpoint.
#[derive(Debug)]
pub struct MemorySubSocket {
    context: MemoryContext,
    subscriptions: Subscriptions,
    endpoint: Option<Endpoint>,
    ops: Arc<RwLock<Vec<SocketOp>>>,
}

impl MemorySubSocket {
    /// Returns every operation issued against this socket, oldest first.
    ///
    /// The log is never truncated: each filter change appends to it for the
    /// life of the socket. Long-lived embedders that re-apply filters often
    /// should prefer [`TcpSubSocket`](super::TcpSubSocket).
    #[must_use]
    pub fn ops(&self) -> Vec<SocketOp> {
        self.ops.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, op: SocketOp) {
        self.ops
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }
}

impl SubSocket for MemorySubSocket {
    async fn bind(&mut self, endpoint: &Endpoint) -> Result<Inbox, TransportError> {
        if let Some(bound) = &self.endpoint {
            return Err(TransportError::AlreadyBound(bound.to_string()));
        }

        let (tx, rx) = mpsc::channel(self.context.queue_capacity);
        {
            let mut endpoints = self
                .context
                .endpoints
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if endpoints.contains_key(endpoint) {
                return Err(TransportError::AddressInUse(endpoint.to_string()));
            }
            endpoints.insert(
                endpoint.clone(),
                Registration {
                    inbox: tx,
                    subscriptions: self.subscriptions.clone(),
                },
            );
        }

        self.endpoint = Some(endpoint.clone());
        self.record(SocketOp::Bind(endpoint.clone()));
        Ok(rx)
    }

    fn subscribe(&self, filter: &str) -> Result<(), TransportError> {
        self.subscriptions.subscribe(filter);
        self.record(SocketOp::Subscribe(filter.to_string()));
        Ok(())
    }

    fn unsubscribe(&self, filter: &str) -> Result<(), TransportError> {
        self.subscriptions.unsubscribe(filter);
        self.record(SocketOp::Unsubscribe(filter.to_string()));
        Ok(())
    }

    fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.snapshot()
    }
}

impl Drop for MemorySubSocket {
    fn drop(&mut self) {
        if let Some(endpoint) = self.endpoint.take() {
            self.context
                .endpoints
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&endpoint);
        }
    }
}
