//! Error types for the aggregator.

use std::io;
use thiserror::Error;

/// Errors raised by a transport socket.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listening endpoint could not be bound.
    #[error("Failed to bind to endpoint {endpoint}: {source}")]
    Bind {
        /// The endpoint that failed to bind.
        endpoint: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Another socket in the same context already owns the endpoint.
    #[error("Address already in use: {0}")]
    AddressInUse(String),

    /// The socket has already been bound.
    #[error("Socket is already bound to {0}")]
    AlreadyBound(String),

    /// A publisher could not reach the endpoint.
    #[error("Failed to connect to endpoint {endpoint}: {source}")]
    Connect {
        /// The endpoint that was dialed.
        endpoint: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An I/O error on an established connection.
    #[error("Transport I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by the [`LogWatcher`](crate::LogWatcher) lifecycle.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The consumer task ended abnormally while stopping.
    #[error("Log consumer task failed: {0}")]
    Consumer(#[from] tokio::task::JoinError),

    /// The inbox was lost with a failed consumer task, so delivery cannot resume.
    #[error("Inbox is no longer available; the watcher must be bound again")]
    InboxLost,
}
