//! Subscriber transports.
//!
//! A [`TransportContext`] creates [`SubSocket`]s. Binding a socket yields an
//! [`Inbox`]: the receiving half of a bounded queue onto which the socket
//! pushes every message whose topic matches one of its subscriptions.
//!
//! Two implementations are provided:
//!
//! - [`TcpContext`] - listens on a TCP endpoint for any number of publishers
//! - [`MemoryContext`] - in-process delivery, useful for tests and embedding

mod memory;
mod publisher;
mod subscriptions;
mod tcp;

pub use memory::{MemoryContext, MemorySubSocket, SocketOp};
pub use publisher::TcpPublisher;
pub use subscriptions::Subscriptions;
pub use tcp::{TcpContext, TcpSubSocket};

use crate::error::TransportError;
use shared::endpoint::Endpoint;
use shared::models::RawLogMessage;
use std::future::Future;
use tokio::sync::mpsc;

/// Default bound on the number of messages queued for the consumer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Receiving half of a bound socket.
pub type Inbox = mpsc::Receiver<RawLogMessage>;

/// Factory for subscriber sockets.
///
/// Contexts are explicit values owned by the caller, so every watcher can be
/// given its own isolated transport.
pub trait TransportContext {
    /// The socket type this context creates.
    type Socket: SubSocket;

    /// Creates a new, unbound subscriber socket.
    fn socket(&self) -> Self::Socket;
}

/// A subscriber socket.
pub trait SubSocket: Send + Sync + 'static {
    /// Binds the socket to `endpoint` and returns its inbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be bound or the socket is
    /// already bound.
    fn bind(
        &mut self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<Inbox, TransportError>> + Send;

    /// Subscribes to topics starting with `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the subscription.
    fn subscribe(&self, filter: &str) -> Result<(), TransportError>;

    /// Removes a subscription. The empty filter removes all subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects the request.
    fn unsubscribe(&self, filter: &str) -> Result<(), TransportError>;

    /// Returns the active subscriptions.
    fn subscriptions(&self) -> Vec<String>;
}
