//! Aggregator configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use crate::transport::DEFAULT_QUEUE_CAPACITY;
use anyhow::{Context, Result};
use shared::endpoint::Endpoint;
use shared::filter::FilterSet;

/// Aggregator configuration.
///
/// Configuration values can be set via environment variables (a `.env` file
/// in the working directory is loaded first, if present):
/// - `LOGWATCH_URL`: The endpoint to listen on (default: `tcp://127.0.0.1:20202`)
/// - `LOGWATCH_TOPICS`: Comma-separated topic prefixes to subscribe to (default: everything)
/// - `LOGWATCH_QUEUE_CAPACITY`: Messages queued before new ones are dropped (default: 1000)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The endpoint to bind to.
    pub endpoint: Endpoint,
    /// The topic filters to subscribe to.
    pub topics: FilterSet,
    /// Inbox capacity.
    pub queue_capacity: usize,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `LOGWATCH_URL` is set but is not a valid `tcp://host:port` endpoint
    /// - `LOGWATCH_QUEUE_CAPACITY` is set but is not a positive integer
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("LOGWATCH_URL")
            .map(|url| url.parse::<Endpoint>())
            .transpose()
            .context("Invalid LOGWATCH_URL")?
            .unwrap_or_default();

        let topics = lookup("LOGWATCH_TOPICS")
            .map(|list| FilterSet::parse(&list))
            .unwrap_or_default();

        let queue_capacity = lookup("LOGWATCH_QUEUE_CAPACITY")
            .map(|c| c.parse::<usize>())
            .transpose()
            .context("Invalid LOGWATCH_QUEUE_CAPACITY")?
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);
        anyhow::ensure!(
            queue_capacity > 0,
            "LOGWATCH_QUEUE_CAPACITY must be greater than zero"
        );

        Ok(Self {
            endpoint,
            topics,
            queue_capacity,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            topics: FilterSet::all(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
