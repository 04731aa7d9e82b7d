//! Integration tests for the TCP transport.
//!
//! Tests cover:
//! - Publishing through `TcpPublisher`
//! - Many concurrent publishers
//! - Subscriber-side topic filtering
//! - Publishers that violate the framing

use shared::filter::FilterSet;
use shared::models::{RawLogMessage, Severity};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use watcher::transport::TcpPublisher;

use super::common::{settle, tcp_watcher, wait_for_entries};

#[tokio::test]
async fn test_publish_log_over_tcp() {
    let (mut watcher, sink, endpoint) = tcp_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    let mut publisher = TcpPublisher::connect(&endpoint).await.unwrap();
    tokio_test::assert_ok!(
        publisher
            .send_log("engine.4", Severity::Critical, "out of memory")
            .await
    );
    tokio_test::assert_ok!(publisher.close().await);

    let entries = wait_for_entries(&sink, 1).await;
    assert_eq!(entries[0].level, Severity::Critical);
    assert_eq!(entries[0].message, "[engine.4] out of memory");
}

#[tokio::test]
async fn test_many_publishers() {
    let (mut watcher, sink, endpoint) = tcp_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    let mut tasks = Vec::new();
    for engine in 0..4 {
        let endpoint = endpoint.clone();
        tasks.push(tokio::spawn(async move {
            let mut publisher = TcpPublisher::connect(&endpoint).await.unwrap();
            for i in 0..5 {
                publisher
                    .send_log(&format!("engine.{engine}"), Severity::Info, &format!("msg {i}"))
                    .await
                    .unwrap();
            }
            publisher.close().await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let entries = wait_for_entries(&sink, 20).await;
    assert_eq!(entries.len(), 20);

    // Per-publisher ordering is preserved.
    for engine in 0..4 {
        let prefix = format!("[engine.{engine}] ");
        let texts: Vec<&str> = entries
            .iter()
            .filter_map(|e| e.message.strip_prefix(prefix.as_str()))
            .collect();
        assert_eq!(texts, vec!["msg 0", "msg 1", "msg 2", "msg 3", "msg 4"]);
    }
}

#[tokio::test]
async fn test_topic_filtering_over_tcp() {
    let (mut watcher, sink, endpoint) = tcp_watcher(&FilterSet::new(["engine.1"])).await;
    watcher.start().unwrap();

    let mut publisher = TcpPublisher::connect(&endpoint).await.unwrap();
    publisher
        .send_log("engine.2", Severity::Info, "other engine")
        .await
        .unwrap();
    publisher
        .send_log("engine.1", Severity::Info, "mine")
        .await
        .unwrap();

    let entries = wait_for_entries(&sink, 1).await;
    settle().await;
    assert_eq!(sink.len(), 1);
    assert_eq!(entries[0].message, "[engine.1] mine");
}

#[tokio::test]
async fn test_bad_framing_only_drops_that_publisher() {
    let (mut watcher, sink, endpoint) = tcp_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    // Declares 1000 parts, above the per-message limit.
    let mut rogue = TcpStream::connect(endpoint.address()).await.unwrap();
    rogue.write_all(&1000u32.to_be_bytes()).await.unwrap();
    rogue.flush().await.unwrap();

    let mut publisher = TcpPublisher::connect(&endpoint).await.unwrap();
    publisher
        .send(RawLogMessage::log("hub.ERROR", "still here\n"))
        .await
        .unwrap();

    let entries = wait_for_entries(&sink, 1).await;
    assert_eq!(entries[0].level, Severity::Error);
    assert_eq!(entries[0].message, "[hub] still here");
}

#[tokio::test]
async fn test_stop_start_over_tcp_keeps_socket() {
    let (mut watcher, sink, endpoint) = tcp_watcher(&FilterSet::all()).await;
    let bound_addr = watcher.socket().local_addr();

    watcher.start().unwrap();
    watcher.stop().await.unwrap();

    let mut publisher = TcpPublisher::connect(&endpoint).await.unwrap();
    publisher
        .send_log("engine.0", Severity::Debug, "while stopped")
        .await
        .unwrap();
    settle().await;
    assert!(sink.is_empty());

    watcher.start().unwrap();
    let entries = wait_for_entries(&sink, 1).await;
    assert_eq!(entries[0].message, "[engine.0] while stopped");
    assert_eq!(watcher.socket().local_addr(), bound_addr);
}
