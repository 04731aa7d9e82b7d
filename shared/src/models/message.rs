//! Log message models.
//!
//! A [`RawLogMessage`] is what arrives off the wire; a [`ParsedLogRecord`] is
//! what gets handed to a sink once the topic has been decoded.

use super::Severity;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;

/// A multipart message as received from a publisher.
///
/// Well-formed log messages have exactly two parts, a topic and a body, but
/// the transport delivers whatever the publisher sent. Parts are raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLogMessage {
    parts: Vec<Bytes>,
}

impl RawLogMessage {
    /// Creates a message from arbitrary parts.
    #[must_use]
    pub fn new(parts: Vec<Bytes>) -> Self {
        Self { parts }
    }

    /// Creates a two-part `(topic, body)` message.
    ///
    /// ```
    /// use shared::models::RawLogMessage;
    ///
    /// let msg = RawLogMessage::log("engine.0.INFO", "hello\n");
    /// assert_eq!(msg.len(), 2);
    /// assert_eq!(msg.topic().map(|t| &t[..]), Some(&b"engine.0.INFO"[..]));
    /// ```
    #[must_use]
    pub fn log(topic: impl Into<Bytes>, body: impl Into<Bytes>) -> Self {
        Self {
            parts: vec![topic.into(), body.into()],
        }
    }

    /// Returns the message parts.
    #[must_use]
    pub fn parts(&self) -> &[Bytes] {
        &self.parts
    }

    /// Consumes the message and returns its parts.
    #[must_use]
    pub fn into_parts(self) -> Vec<Bytes> {
        self.parts
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if the message has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the first part, which the transport treats as the topic.
    #[must_use]
    pub fn topic(&self) -> Option<&Bytes> {
        self.parts.first()
    }
}

impl From<Vec<Bytes>> for RawLogMessage {
    fn from(parts: Vec<Bytes>) -> Self {
        Self::new(parts)
    }
}

impl fmt::Display for RawLogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", String::from_utf8_lossy(part))?;
        }
        f.write_str("]")
    }
}

/// A log record decoded from a [`RawLogMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLogRecord {
    /// Severity recovered from the topic.
    pub level: Severity,
    /// Logical source, the dot-joined topic segments left after decoding.
    pub source: String,
    /// Message body with at most one trailing newline removed.
    pub text: String,
}

impl ParsedLogRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(level: Severity, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            text: text.into(),
        }
    }

    /// Renders the record as a single sink entry: `"[<source>] <text>"`.
    ///
    /// ```
    /// use shared::models::{ParsedLogRecord, Severity};
    ///
    /// let record = ParsedLogRecord::new(Severity::Info, "engine.0", "ready");
    /// assert_eq!(record.formatted(), "[engine.0] ready");
    /// ```
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("[{}] {}", self.source, self.text)
    }
}
