//! Logwatch Aggregator Binary
//!
//! Entry point for the log aggregator, configured from the environment.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    watcher::logging::init_tracing();

    watcher::run_watcher().await
}
