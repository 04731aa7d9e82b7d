//! Topic filter sets.
//!
//! A filter is a topic prefix. The empty filter matches every topic, and a
//! set containing it subscribes to everything regardless of its other
//! members.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The filter that matches every topic.
pub const MATCH_ALL: &str = "";

/// An ordered list of topic prefix filters.
///
/// Duplicates are allowed and preserved; order is the order in which
/// subscriptions are issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(Vec<String>);

impl FilterSet {
    /// Creates a filter set from a list of prefixes.
    #[must_use]
    pub fn new<I, S>(filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(filters.into_iter().map(Into::into).collect())
    }

    /// Returns the set that subscribes to everything.
    #[must_use]
    pub fn all() -> Self {
        Self(vec![MATCH_ALL.to_string()])
    }

    /// Parses a comma-separated list of filters.
    ///
    /// Whitespace around each filter is trimmed. A blank list yields
    /// [`FilterSet::all`]; a blank entry inside a list is the match-all
    /// filter.
    ///
    /// ```
    /// use shared::filter::FilterSet;
    ///
    /// assert_eq!(FilterSet::parse("engine, hub"), FilterSet::new(["engine", "hub"]));
    /// assert!(FilterSet::parse("").subscribes_all());
    /// assert!(FilterSet::parse("engine,").subscribes_all());
    /// ```
    #[must_use]
    pub fn parse(list: &str) -> Self {
        if list.trim().is_empty() {
            return Self::all();
        }
        Self::new(list.split(',').map(str::trim))
    }

    /// Returns true if the set contains the match-all filter.
    #[must_use]
    pub fn subscribes_all(&self) -> bool {
        self.0.iter().any(|f| f == MATCH_ALL)
    }

    /// Returns true if any filter is a prefix of `topic`.
    #[must_use]
    pub fn matches(&self, topic: &[u8]) -> bool {
        self.0.iter().any(|f| topic.starts_with(f.as_bytes()))
    }

    /// Appends a filter.
    pub fn push(&mut self, filter: impl Into<String>) {
        self.0.push(filter.into());
    }

    /// Removes the first occurrence of `filter`. Returns true if one was removed.
    pub fn remove(&mut self, filter: &str) -> bool {
        match self.0.iter().position(|f| f == filter) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes every filter, leaving a set that matches nothing.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterates over the filters in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set has no filters.
    ///
    /// An empty set subscribes to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subscribes_all() {
            return f.write_str("everything");
        }
        let quoted: Vec<String> = self.0.iter().map(|t| format!("{t:?}")).collect();
        write!(f, "[{}]", quoted.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for FilterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
