//! The aggregator service.
//!
//! A [`LogWatcher`] owns one bound subscriber socket and at most one consumer
//! task. The consumer drains the socket inbox in arrival order and hands
//! each message to the [`Dispatcher`]. Stopping the consumer hands the inbox
//! back to the watcher, so messages queued while stopped are delivered after
//! the next `start()`.

use crate::dispatcher::Dispatcher;
use crate::error::WatcherError;
use crate::sink::LogSink;
use crate::subscription::SubscriptionManager;
use crate::transport::{Inbox, SubSocket, TransportContext};
use shared::endpoint::Endpoint;
use shared::filter::FilterSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle state of a [`LogWatcher`].
///
/// A watcher comes into existence already bound; `Created` is the state of
/// the inputs to [`LogWatcher::bind`] and is never observed on a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Bound and subscribed, never started.
    Bound,
    /// The consumer task is running.
    Listening,
    /// The consumer task was stopped; the socket is still bound.
    Stopped,
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound => write!(f, "bound"),
            Self::Listening => write!(f, "listening"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

struct Consumer {
    cancel: CancellationToken,
    handle: JoinHandle<Inbox>,
}

/// Consolidates log messages from many publishers into one sink.
///
/// # Example
///
/// ```
/// use shared::endpoint::Endpoint;
/// use shared::filter::FilterSet;
/// use shared::models::RawLogMessage;
/// use watcher::sink::MemorySink;
/// use watcher::transport::MemoryContext;
/// use watcher::LogWatcher;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), watcher::WatcherError> {
/// let context = MemoryContext::new();
/// let endpoint = Endpoint::default();
/// let sink = MemorySink::new();
///
/// let mut watcher = LogWatcher::bind(&context, endpoint.clone(), &FilterSet::all(), sink.clone()).await?;
/// context.publish(&endpoint, RawLogMessage::log("engine.0.WARNING", "slow\n"));
///
/// watcher.start()?;
/// while sink.is_empty() {
///     tokio::task::yield_now().await;
/// }
/// watcher.stop().await?;
///
/// assert_eq!(sink.entries()[0].message, "[engine.0] slow");
/// # Ok(())
/// # }
/// ```
pub struct LogWatcher<S: SubSocket, K: LogSink> {
    socket: S,
    endpoint: Endpoint,
    subscriptions: SubscriptionManager,
    dispatcher: Arc<Dispatcher<K>>,
    inbox: Option<Inbox>,
    consumer: Option<Consumer>,
    state: WatcherState,
}

impl<S: SubSocket, K: LogSink> LogWatcher<S, K> {
    /// Creates a socket from `context`, binds it to `endpoint`, and applies
    /// the initial filter set.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be bound or the subscriptions
    /// cannot be applied.
    pub async fn bind<C>(
        context: &C,
        endpoint: Endpoint,
        filters: &FilterSet,
        sink: K,
    ) -> Result<Self, WatcherError>
    where
        C: TransportContext<Socket = S>,
    {
        let mut socket = context.socket();
        let inbox = socket.bind(&endpoint).await?;

        let mut subscriptions = SubscriptionManager::new();
        subscriptions.apply(&socket, filters)?;

        info!(%endpoint, topics = %filters, "Log watcher bound");

        Ok(Self {
            socket,
            endpoint,
            subscriptions,
            dispatcher: Arc::new(Dispatcher::new(sink)),
            inbox: Some(inbox),
            consumer: None,
            state: WatcherState::Bound,
        })
    }

    /// Starts consuming messages. Does nothing if already listening.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::InboxLost`] if a previous consumer task
    /// panicked and took the inbox with it.
    pub fn start(&mut self) -> Result<(), WatcherError> {
        if self.consumer.is_some() {
            return Ok(());
        }

        let inbox = self.inbox.take().ok_or(WatcherError::InboxLost)?;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(consume(
            inbox,
            Arc::clone(&self.dispatcher),
            cancel.clone(),
        ));

        self.consumer = Some(Consumer { cancel, handle });
        self.state = WatcherState::Listening;
        debug!(endpoint = %self.endpoint, "Log watcher listening");
        Ok(())
    }

    /// Stops consuming messages. Does nothing if not listening.
    ///
    /// The socket stays bound and subscribed; messages keep queueing in the
    /// inbox (up to its capacity) until the next [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::Consumer`] if the consumer task panicked.
    pub async fn stop(&mut self) -> Result<(), WatcherError> {
        let Some(consumer) = self.consumer.take() else {
            return Ok(());
        };

        consumer.cancel.cancel();
        self.state = WatcherState::Stopped;
        let inbox = consumer.handle.await?;
        self.inbox = Some(inbox);

        debug!(endpoint = %self.endpoint, "Log watcher stopped");
        Ok(())
    }

    /// Replaces the socket's subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket rejects a subscription change.
    pub fn apply_filters(&mut self, filters: &FilterSet) -> Result<(), WatcherError> {
        self.subscriptions.apply(&self.socket, filters)?;
        info!(topics = %filters, "Log watcher subscriptions updated");
        Ok(())
    }

    /// Starts consuming, waits for `shutdown` to complete, then stops.
    ///
    /// # Errors
    ///
    /// Returns an error if starting or stopping fails.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), WatcherError>
    where
        F: Future<Output = ()>,
    {
        self.start()?;
        shutdown.await;
        self.stop().await
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Returns the endpoint the watcher was bound to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the filter set currently applied.
    #[must_use]
    pub fn filters(&self) -> Option<&FilterSet> {
        self.subscriptions.current()
    }

    /// Returns the underlying socket.
    #[must_use]
    pub fn socket(&self) -> &S {
        &self.socket
    }

    /// Returns the sink records are forwarded to.
    #[must_use]
    pub fn sink(&self) -> &K {
        self.dispatcher.sink()
    }
}

impl<S: SubSocket, K: LogSink> fmt::Debug for LogWatcher<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWatcher")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("filters", &self.subscriptions.current())
            .finish_non_exhaustive()
    }
}

impl<S: SubSocket, K: LogSink> Drop for LogWatcher<S, K> {
    fn drop(&mut self) {
        if let Some(consumer) = self.consumer.take() {
            consumer.cancel.cancel();
        }
    }
}

async fn consume<K: LogSink>(
    mut inbox: Inbox,
    dispatcher: Arc<Dispatcher<K>>,
    cancel: CancellationToken,
) -> Inbox {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = inbox.recv() => match next {
                Some(message) => dispatcher.on_message(&message),
                None => {
                    warn!("Transport closed the inbox; waiting for stop");
                    cancel.cancelled().await;
                    break;
                }
            },
        }
    }
    inbox
}
