//! Logwatch Shared Library
//!
//! This crate contains the types and pure logic shared by the Logwatch
//! aggregator and the tools that publish to it.
//!
//! # Modules
//!
//! - [`models`] - Severity levels and log message models
//! - [`topic`] - Recovering severity and source from a topic
//! - [`filter`] - Topic filter sets
//! - [`endpoint`] - `tcp://host:port` endpoints
//! - [`wire`] - Multipart message framing
//!
//! # Example
//!
//! ```
//! use shared::models::Severity;
//! use shared::topic::extract_level_and_source;
//!
//! let (level, source) = extract_level_and_source("engine.0.INFO.extra");
//!
//! assert_eq!(level, Severity::Info);
//! assert_eq!(source, "engine.0.extra");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod endpoint;
pub mod filter;
pub mod models;
pub mod topic;
pub mod wire;

/// Re-export common dependencies for convenience.
pub use bytes;
pub use serde;
