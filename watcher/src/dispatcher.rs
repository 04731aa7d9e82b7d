//! Message dispatch.
//!
//! Turns raw `(topic, body)` messages into sink entries. Malformed messages
//! are reported through the sink at error level and never interrupt the
//! consumer.

use crate::sink::LogSink;
use shared::models::{ParsedLogRecord, RawLogMessage, Severity};
use shared::topic::{scan_level, split_trailing_segment};
use thiserror::Error;

/// Why a message was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMessage {
    /// The message does not have exactly two parts.
    #[error("Invalid log message: {0}")]
    WrongPartCount(String),

    /// The topic has no `.` separator.
    #[error("Invalid log message: {0}")]
    MissingSeparator(String),
}

/// Decodes a raw message into a record.
///
/// The topic is first split on its last `.`. The remaining prefix is scanned
/// for an embedded severity (see [`shared::topic::extract_level_and_source`]),
/// which wins when present; otherwise the trailing segment is used as the
/// level if it names one, and the level defaults to `INFO`. The trailing
/// segment never appears in the source. One trailing newline is stripped
/// from the body.
///
/// # Errors
///
/// Returns [`InvalidMessage`] if the message does not have exactly two parts
/// or its topic contains no `.`.
///
/// # Example
///
/// ```
/// use shared::models::{RawLogMessage, Severity};
/// use watcher::dispatcher::parse_message;
///
/// let record = parse_message(&RawLogMessage::log("engine.0.INFO.extra", "hello\n")).unwrap();
/// assert_eq!(record.level, Severity::Info);
/// assert_eq!(record.source, "engine.0");
/// assert_eq!(record.text, "hello");
/// ```
pub fn parse_message(raw: &RawLogMessage) -> Result<ParsedLogRecord, InvalidMessage> {
    let [topic, body] = raw.parts() else {
        return Err(InvalidMessage::WrongPartCount(raw.to_string()));
    };

    let topic = String::from_utf8_lossy(topic);
    let Some((prefix, trailing)) = split_trailing_segment(&topic) else {
        return Err(InvalidMessage::MissingSeparator(raw.to_string()));
    };

    let (embedded, source) = scan_level(prefix);
    let level = embedded
        .or_else(|| Severity::from_name(trailing))
        .unwrap_or_default();
    tracing::trace!(%level, %source, trailing, "Decoded log topic");

    let body = String::from_utf8_lossy(body);
    let text = body.strip_suffix('\n').unwrap_or(&*body);

    Ok(ParsedLogRecord::new(level, source, text))
}

/// Forwards decoded messages to a sink.
#[derive(Debug, Clone)]
pub struct Dispatcher<S> {
    sink: S,
}

impl<S: LogSink> Dispatcher<S> {
    /// Creates a dispatcher writing to `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handles one message.
    ///
    /// Valid messages produce exactly one sink entry, `"[<source>] <text>"`,
    /// at the decoded severity. Invalid messages produce exactly one
    /// error-level entry describing the message.
    pub fn on_message(&self, raw: &RawLogMessage) {
        match parse_message(raw) {
            Ok(record) => self.sink.emit(record.level, &record.formatted()),
            Err(invalid) => self.sink.emit(Severity::Error, &invalid.to_string()),
        }
    }
}
