//! Logging sinks.
//!
//! A sink is the local destination for aggregated records. It receives one
//! `(severity, message)` pair per accepted message, plus error-level entries
//! for messages that could not be decoded.

use shared::models::Severity;
use std::sync::{Arc, PoisonError, RwLock};

/// Tracing target used for records forwarded from remote workers.
pub const REMOTE_TARGET: &str = "logwatch::remote";

/// Destination for aggregated log records.
///
/// Implementations must not block; they run on the consumer task.
pub trait LogSink: Send + Sync + 'static {
    /// Emits a single formatted entry at the given severity.
    fn emit(&self, level: Severity, message: &str);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, level: Severity, message: &str) {
        (**self).emit(level, message);
    }
}

/// Forwards records to `tracing` under the [`REMOTE_TARGET`] target.
///
/// `CRITICAL` has no tracing counterpart; it is emitted at error level with
/// a `critical = true` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, level: Severity, message: &str) {
        match level {
            Severity::Debug => tracing::debug!(target: REMOTE_TARGET, "{message}"),
            Severity::Info => tracing::info!(target: REMOTE_TARGET, "{message}"),
            Severity::Warning => tracing::warn!(target: REMOTE_TARGET, "{message}"),
            Severity::Error => tracing::error!(target: REMOTE_TARGET, "{message}"),
            Severity::Critical => {
                tracing::error!(target: REMOTE_TARGET, critical = true, "{message}");
            }
        }
    }
}

/// An entry captured by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkEntry {
    /// Severity the entry was emitted at.
    pub level: Severity,
    /// The formatted message.
    pub message: String,
}

/// Keeps every emitted entry in memory.
///
/// Clones share the same entries, so a clone can be handed to a watcher
/// while the original is inspected.
///
/// # Example
///
/// ```
/// use shared::models::Severity;
/// use watcher::sink::{LogSink, MemorySink};
///
/// let sink = MemorySink::new();
/// sink.emit(Severity::Info, "[engine.0] ready");
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.entries()[0].message, "[engine.0] ready");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<RwLock<Vec<SinkEntry>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<SinkEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the entries emitted at exactly `level`.
    #[must_use]
    pub fn entries_at(&self, level: Severity) -> Vec<SinkEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Severity, message: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SinkEntry {
                level,
                message: message.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(Severity::Info, "first");
        sink.emit(Severity::Error, "second");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].level, Severity::Error);
    }

    #[test]
    fn test_memory_sink_clones_share_entries() {
        let sink = MemorySink::new();
        let handle = sink.clone();
        handle.emit(Severity::Debug, "x");
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_memory_sink_entries_at() {
        let sink = MemorySink::new();
        sink.emit(Severity::Info, "a");
        sink.emit(Severity::Warning, "b");
        sink.emit(Severity::Info, "c");

        let infos: Vec<String> = sink
            .entries_at(Severity::Info)
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(infos, vec!["a", "c"]);
    }

    #[test]
    fn test_arc_sink_delegates() {
        let sink = Arc::new(MemorySink::new());
        LogSink::emit(&sink, Severity::Info, "via arc");
        assert_eq!(sink.len(), 1);
    }

    #[traced_test]
    #[test]
    fn test_tracing_sink_forwards_messages() {
        TracingSink.emit(Severity::Warning, "[engine.1] disk almost full");
        TracingSink.emit(Severity::Critical, "[hub] lost quorum");

        assert!(logs_contain("[engine.1] disk almost full"));
        assert!(logs_contain("[hub] lost quorum"));
        assert!(logs_contain("critical=true"));
    }
}
