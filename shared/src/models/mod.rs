//! Data models for the Logwatch aggregator.
//!
//! This module contains the severity scale and the message types that flow
//! from the transport to the logging sink.

pub mod message;
pub mod severity;

pub use message::{ParsedLogRecord, RawLogMessage};
pub use severity::{Severity, UnknownSeverity};
