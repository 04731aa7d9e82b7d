//! Subscription table shared by socket implementations.

use shared::filter::{FilterSet, MATCH_ALL};
use shared::models::RawLogMessage;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Prefix subscriptions held by a subscriber socket.
///
/// Subscriptions form a multiset: subscribing twice to the same prefix
/// requires two unsubscribes to remove it. Unsubscribing from the empty
/// prefix is a wildcard and removes every subscription.
#[derive(Debug, Clone)]
pub struct Subscriptions {
    filters: Arc<RwLock<FilterSet>>,
}

impl Subscriptions {
    /// Creates an empty table; nothing matches until something is subscribed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Arc::new(RwLock::new(FilterSet::new(Vec::<String>::new()))),
        }
    }

    /// Adds a prefix subscription.
    pub fn subscribe(&self, filter: &str) {
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(filter);
    }

    /// Removes one subscription to `filter`, or all of them for the empty prefix.
    pub fn unsubscribe(&self, filter: &str) {
        let mut filters = self.filters.write().unwrap_or_else(PoisonError::into_inner);
        if filter == MATCH_ALL {
            filters.clear();
        } else {
            filters.remove(filter);
        }
    }

    /// Returns true if the message topic starts with any subscribed prefix.
    ///
    /// Messages without parts never match.
    #[must_use]
    pub fn matches(&self, message: &RawLogMessage) -> bool {
        let Some(topic) = message.topic() else {
            return false;
        };
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .matches(topic)
    }

    /// Returns the current subscriptions in the order they were made.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(str::to_string)
            .collect()
    }
}

impl Default for Subscriptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Queues a message for the subscriber if it passes the subscription filter.
///
/// A full inbox drops the message, as a slow subscriber would under a
/// high-water mark. Returns true if the message was queued.
pub(crate) fn deliver(
    inbox: &mpsc::Sender<RawLogMessage>,
    subscriptions: &Subscriptions,
    message: RawLogMessage,
) -> bool {
    if !subscriptions.matches(&message) {
        return false;
    }
    match inbox.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::debug!("Inbox full, dropping log message");
            false
        }
        Err(TrySendError::Closed(_)) => false,
    }
}
