//! Transport endpoints.
//!
//! Endpoints are written as `tcp://<host>:<port>`. The aggregator binds to
//! its endpoint; publishers connect to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Port the aggregator listens on when none is configured.
pub const DEFAULT_PORT: u16 = 20202;

/// Host the aggregator listens on when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

const TCP_SCHEME: &str = "tcp://";

/// Errors that can occur while parsing an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The endpoint does not start with a supported scheme.
    #[error("Unsupported endpoint scheme in {0:?}, expected tcp://host:port")]
    UnsupportedScheme(String),

    /// The endpoint has no `:port` suffix.
    #[error("Endpoint {0:?} is missing a port")]
    MissingPort(String),

    /// The host part is empty.
    #[error("Endpoint {0:?} is missing a host")]
    MissingHost(String),

    /// The port is not a valid number.
    #[error("Invalid port {port:?} in endpoint {endpoint:?}")]
    InvalidPort {
        /// The offending endpoint.
        endpoint: String,
        /// The port text that failed to parse.
        port: String,
    },
}

/// A TCP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from a host and port.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns `host:port`, suitable for socket binding or connecting.
    ///
    /// IPv6 hosts are bracketed.
    #[must_use]
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::tcp(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TCP_SCHEME}{}", self.address())
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    /// Parses `tcp://host:port`.
    ///
    /// ```
    /// use shared::endpoint::Endpoint;
    ///
    /// let endpoint: Endpoint = "tcp://10.0.0.5:20202".parse().unwrap();
    /// assert_eq!(endpoint.host(), "10.0.0.5");
    /// assert_eq!(endpoint.port(), 20202);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(TCP_SCHEME)
            .ok_or_else(|| EndpointError::UnsupportedScheme(s.to_string()))?;

        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| EndpointError::MissingPort(s.to_string()))?;

        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(EndpointError::MissingHost(s.to_string()));
        }

        let port = port.parse::<u16>().map_err(|_| EndpointError::InvalidPort {
            endpoint: s.to_string(),
            port: port.to_string(),
        })?;

        Ok(Self::tcp(host, port))
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}
