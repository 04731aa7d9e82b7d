//! Severity levels for aggregated log records.
//!
//! Levels follow the conventional names used by log-publishing handlers on
//! the worker side, so a level token embedded in a topic can be recognized
//! verbatim.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Log severity level.
///
/// Ordered from least to most severe. The numeric values match the
/// conventional logging levels (10 through 50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Debug information.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warning,
    /// Error conditions.
    Error,
    /// Critical conditions.
    Critical,
}

/// Error returned when a string is not a canonical severity name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown severity name: {0}")]
pub struct UnknownSeverity(pub String);

impl Severity {
    /// All severities, least severe first.
    pub const ALL: [Severity; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Returns the conventional numeric level.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Looks up a severity by its exact canonical name.
    ///
    /// Matching is case-sensitive: `"INFO"` is a severity, `"info"` is not.
    ///
    /// ```
    /// use shared::models::Severity;
    ///
    /// assert_eq!(Severity::from_name("WARNING"), Some(Severity::Warning));
    /// assert_eq!(Severity::from_name("warning"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSeverity(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_severity_default_is_info() {
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Debug.to_string(), "DEBUG");
        assert_eq!(Severity::Info.to_string(), "INFO");
        assert_eq!(Severity::Warning.to_string(), "WARNING");
        assert_eq!(Severity::Error.to_string(), "ERROR");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_severity_values() {
        let values: Vec<u8> = Severity::ALL.iter().map(|s| s.value()).collect();
        assert_eq!(values, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_severity_parse_is_case_sensitive() {
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("error".parse::<Severity>().is_err());
        assert!("Error".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_rejects_aliases() {
        assert_eq!(Severity::from_name("WARN"), None);
        assert_eq!(Severity::from_name("FATAL"), None);
        assert_eq!(Severity::from_name(""), None);
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"WARNING\""
        );
        let level: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(level, Severity::Critical);
    }
}
