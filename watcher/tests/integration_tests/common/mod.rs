//! Common test utilities and helpers for integration tests.

use shared::endpoint::Endpoint;
use shared::filter::FilterSet;
use std::time::Duration;
use watcher::sink::{MemorySink, SinkEntry};
use watcher::transport::{MemoryContext, MemorySubSocket, TcpContext, TcpSubSocket};
use watcher::LogWatcher;

/// How long to wait for asynchronous delivery before failing a test.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Endpoint used for in-memory watchers.
pub fn memory_endpoint() -> Endpoint {
    Endpoint::tcp("memory.test", 20202)
}

/// Creates an in-memory watcher bound to [`memory_endpoint`].
///
/// # Returns
///
/// A tuple containing the context to publish through, the watcher, and the
/// sink it forwards to.
pub async fn memory_watcher(
    filters: &FilterSet,
) -> (MemoryContext, LogWatcher<MemorySubSocket, MemorySink>, MemorySink) {
    let context = MemoryContext::new();
    let sink = MemorySink::new();
    let watcher = LogWatcher::bind(&context, memory_endpoint(), filters, sink.clone())
        .await
        .unwrap();
    (context, watcher, sink)
}

/// Creates a TCP watcher bound to an ephemeral loopback port.
///
/// # Returns
///
/// A tuple containing the watcher, the sink, and the endpoint publishers
/// should connect to.
pub async fn tcp_watcher(
    filters: &FilterSet,
) -> (LogWatcher<TcpSubSocket, MemorySink>, MemorySink, Endpoint) {
    let sink = MemorySink::new();
    let watcher = LogWatcher::bind(
        &TcpContext::new(),
        Endpoint::tcp("127.0.0.1", 0),
        filters,
        sink.clone(),
    )
    .await
    .unwrap();

    let port = watcher.socket().local_addr().unwrap().port();
    (watcher, sink, Endpoint::tcp("127.0.0.1", port))
}

/// Waits until the sink holds at least `count` entries and returns them.
pub async fn wait_for_entries(sink: &MemorySink, count: usize) -> Vec<SinkEntry> {
    tokio::time::timeout(DELIVERY_TIMEOUT, async {
        while sink.len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {count} entries, got {:?}", sink.entries()));
    sink.entries()
}

/// Gives in-flight messages a chance to arrive, for asserting that nothing did.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
