//! Subscription management.
//!
//! Applying a filter set always starts from a clean slate: every existing
//! subscription is dropped with a wildcard unsubscribe, then the requested
//! filters are subscribed again. Messages published between the two steps
//! may be lost; in exchange the socket always ends up with exactly the
//! requested subscriptions, whatever state it was in before.

use crate::error::TransportError;
use crate::transport::SubSocket;
use shared::filter::{FilterSet, MATCH_ALL};
use tracing::debug;

/// Tracks and applies the filter set of a subscriber socket.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionManager {
    current: Option<FilterSet>,
}

impl SubscriptionManager {
    /// Creates a manager that has not applied anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the socket's subscriptions with `filters`.
    ///
    /// If `filters` contains the match-all filter, a single match-all
    /// subscription is made and every other filter is ignored. Applying the
    /// same set twice leaves the socket in the same state as applying it once.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket rejects a subscription change. The
    /// socket may then hold a subset of the requested filters.
    pub fn apply<S: SubSocket>(
        &mut self,
        socket: &S,
        filters: &FilterSet,
    ) -> Result<(), TransportError> {
        socket.unsubscribe(MATCH_ALL)?;

        if filters.subscribes_all() {
            debug!("Subscribing to: everything");
            socket.subscribe(MATCH_ALL)?;
        } else {
            for filter in filters.iter() {
                debug!(filter, "Subscribing to: {filter:?}");
                socket.subscribe(filter)?;
            }
        }

        self.current = Some(filters.clone());
        Ok(())
    }

    /// Returns the last successfully applied filter set.
    #[must_use]
    pub fn current(&self) -> Option<&FilterSet> {
        self.current.as_ref()
    }
}
