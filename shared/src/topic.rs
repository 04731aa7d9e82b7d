//! Topic codec.
//!
//! Publishers encode the severity of a record inside its dot-segmented
//! topic, e.g. `engine.0.INFO.extra`. This module recovers the severity and
//! the remaining logical source label from such a topic.

use crate::models::Severity;

/// Separator between topic segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Extracts the embedded severity and the residual source from a topic.
///
/// The topic is split on `.` and scanned left to right. The first segment
/// that exactly matches a canonical severity name is taken as the level and
/// removed; the remaining segments are rejoined with `.`. When no segment
/// matches, the level is [`Severity::Info`] and the topic is returned as is.
///
/// # Example
///
/// ```
/// use shared::models::Severity;
/// use shared::topic::extract_level_and_source;
///
/// let (level, source) = extract_level_and_source("engine.0.ERROR.extra");
/// assert_eq!(level, Severity::Error);
/// assert_eq!(source, "engine.0.extra");
///
/// let (level, source) = extract_level_and_source("hub.registration");
/// assert_eq!(level, Severity::Info);
/// assert_eq!(source, "hub.registration");
/// ```
#[must_use]
pub fn extract_level_and_source(topic: &str) -> (Severity, String) {
    let (level, source) = scan_level(topic);
    (level.unwrap_or_default(), source)
}

/// Like [`extract_level_and_source`], but reports whether a level was found.
///
/// Returns `None` as the level when no segment names a severity; the source
/// is then the unchanged topic.
///
/// ```
/// use shared::models::Severity;
/// use shared::topic::scan_level;
///
/// assert_eq!(scan_level("a.INFO.b"), (Some(Severity::Info), "a.b".to_string()));
/// assert_eq!(scan_level("a.b"), (None, "a.b".to_string()));
/// ```
#[must_use]
pub fn scan_level(topic: &str) -> (Option<Severity>, String) {
    let mut segments: Vec<&str> = topic.split(SEGMENT_SEPARATOR).collect();

    let found = segments
        .iter()
        .enumerate()
        .find_map(|(idx, segment)| Severity::from_name(segment).map(|level| (idx, level)));

    match found {
        Some((idx, level)) => {
            segments.remove(idx);
            (Some(level), segments.join("."))
        }
        None => (None, topic.to_string()),
    }
}

/// Splits a topic on its last `.` into `(prefix, trailing_segment)`.
///
/// Returns `None` when the topic contains no separator.
///
/// ```
/// use shared::topic::split_trailing_segment;
///
/// assert_eq!(split_trailing_segment("engine.0.INFO"), Some(("engine.0", "INFO")));
/// assert_eq!(split_trailing_segment("engine"), None);
/// ```
#[must_use]
pub fn split_trailing_segment(topic: &str) -> Option<(&str, &str)> {
    topic.rsplit_once(SEGMENT_SEPARATOR)
}
