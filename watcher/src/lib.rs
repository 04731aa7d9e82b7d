//! Logwatch Aggregator
//!
//! This crate consolidates log records published by many worker processes
//! into one local log stream. Workers publish `(topic, body)` messages whose
//! topic carries the record's severity, e.g. `engine.0.ERROR`; the
//! aggregator subscribes to those topics, recovers the severity and source,
//! and forwards each record to a [`sink::LogSink`].
//!
//! # Architecture
//!
//! - [`transport`] - subscriber sockets (TCP and in-memory) and a TCP publisher
//! - [`subscription`] - applies topic filter sets to a socket
//! - [`dispatcher`] - validates and decodes messages, feeds the sink
//! - [`LogWatcher`] - binds, subscribes, and runs the consumer task
//!
//! # Example
//!
//! ```no_run
//! use watcher::run_watcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_watcher().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod dispatcher;
mod error;
pub mod logging;
mod service;
pub mod sink;
pub mod subscription;
pub mod transport;

pub use config::Config;
pub use error::{TransportError, WatcherError};
pub use service::{LogWatcher, WatcherState};

use anyhow::Result;
use sink::TracingSink;
use transport::TcpContext;

/// Runs the aggregator.
///
/// This function loads configuration from environment variables, binds the
/// listening endpoint, and forwards records to `tracing` until SIGTERM/SIGINT.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The endpoint cannot be bound
pub async fn run_watcher() -> Result<()> {
    let config = Config::from_env()?;
    run_watcher_with_config(config).await
}

/// Runs the aggregator with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The endpoint cannot be bound
/// - The consumer task fails while shutting down
pub async fn run_watcher_with_config(config: Config) -> Result<()> {
    tracing::info!(
        endpoint = %config.endpoint,
        topics = %config.topics,
        queue_capacity = config.queue_capacity,
        "Logwatch aggregator starting"
    );

    let context = TcpContext::new().with_queue_capacity(config.queue_capacity);
    let mut watcher =
        LogWatcher::bind(&context, config.endpoint, &config.topics, TracingSink).await?;

    watcher.run_until(shutdown_signal()).await?;

    tracing::info!("Aggregator shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
