//! Integration tests for the watcher lifecycle over the in-memory transport.
//!
//! Tests cover:
//! - Decoding and forwarding records
//! - Malformed message reporting
//! - Re-subscription convergence
//! - Stop/start without re-binding

use shared::bytes::Bytes;
use shared::filter::FilterSet;
use shared::models::{RawLogMessage, Severity};
use watcher::transport::{SocketOp, SubSocket};
use watcher::WatcherState;

use super::common::{memory_endpoint, memory_watcher, settle, wait_for_entries};

#[tokio::test]
async fn test_record_is_forwarded_at_embedded_level() {
    let (context, mut watcher, sink) = memory_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    context.publish(
        &memory_endpoint(),
        RawLogMessage::log("engine.0.INFO.extra", "hello\n"),
    );

    let entries = wait_for_entries(&sink, 1).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, Severity::Info);
    assert_eq!(entries[0].message, "[engine.0] hello");
}

#[tokio::test]
async fn test_every_severity_round_trips() {
    let (context, mut watcher, sink) = memory_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    for level in Severity::ALL {
        context.publish(
            &memory_endpoint(),
            RawLogMessage::log(format!("controller.{level}"), format!("{level} message\n")),
        );
    }

    let entries = wait_for_entries(&sink, Severity::ALL.len()).await;
    let levels: Vec<Severity> = entries.iter().map(|e| e.level).collect();
    assert_eq!(levels, Severity::ALL.to_vec());
    assert_eq!(entries[3].message, "[controller] ERROR message");
}

#[tokio::test]
async fn test_malformed_messages_report_once_each() {
    let (context, mut watcher, sink) = memory_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    context.publish(
        &memory_endpoint(),
        RawLogMessage::new(vec![Bytes::from_static(b"engine.0.INFO")]),
    );
    context.publish(&memory_endpoint(), RawLogMessage::log("nodot", "body"));

    let entries = wait_for_entries(&sink, 2).await;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.level == Severity::Error));
    assert!(entries
        .iter()
        .all(|e| e.message.starts_with("Invalid log message:")));
}

#[tokio::test]
async fn test_resubscribe_from_all_to_specific() {
    let (context, mut watcher, sink) = memory_watcher(&FilterSet::all()).await;
    watcher.start().unwrap();

    watcher.apply_filters(&FilterSet::new(["a", "b"])).unwrap();
    assert_eq!(
        watcher.socket().subscriptions(),
        vec!["a".to_string(), "b".to_string()]
    );

    assert!(context.publish(&memory_endpoint(), RawLogMessage::log("a.INFO", "1")));
    assert!(context.publish(&memory_endpoint(), RawLogMessage::log("b.INFO", "2")));
    assert!(!context.publish(&memory_endpoint(), RawLogMessage::log("c.INFO", "3")));

    let entries = wait_for_entries(&sink, 2).await;
    settle().await;
    assert_eq!(sink.len(), 2);
    assert_eq!(entries[0].message, "[a] 1");
    assert_eq!(entries[1].message, "[b] 2");
}

#[tokio::test]
async fn test_resubscribe_issues_reset_then_filters() {
    let (_context, mut watcher, _sink) = memory_watcher(&FilterSet::new(["x"])).await;

    watcher.apply_filters(&FilterSet::new(["y", "z"])).unwrap();

    let ops = watcher.socket().ops();
    assert_eq!(
        &ops[ops.len() - 3..],
        &[
            SocketOp::Unsubscribe(String::new()),
            SocketOp::Subscribe("y".to_string()),
            SocketOp::Subscribe("z".to_string()),
        ]
    );
    assert_eq!(watcher.filters(), Some(&FilterSet::new(["y", "z"])));
}

#[tokio::test]
async fn test_apply_twice_equals_once() {
    let (_context, mut watcher, _sink) = memory_watcher(&FilterSet::all()).await;

    watcher.apply_filters(&FilterSet::new(["engine", "hub"])).unwrap();
    let once = watcher.socket().subscriptions();
    watcher.apply_filters(&FilterSet::new(["engine", "hub"])).unwrap();

    assert_eq!(watcher.socket().subscriptions(), once);
}

#[tokio::test]
async fn test_stop_start_resumes_delivery() {
    let (context, mut watcher, sink) = memory_watcher(&FilterSet::all()).await;
    let ops_after_bind = watcher.socket().ops();

    watcher.start().unwrap();
    watcher.stop().await.unwrap();
    assert_eq!(watcher.state(), WatcherState::Stopped);

    context.publish(&memory_endpoint(), RawLogMessage::log("hub.WARNING", "queued\n"));
    settle().await;
    assert!(sink.is_empty());

    watcher.start().unwrap();
    let entries = wait_for_entries(&sink, 1).await;
    assert_eq!(entries[0].level, Severity::Warning);
    assert_eq!(entries[0].message, "[hub] queued");

    assert_eq!(watcher.socket().ops(), ops_after_bind);
    assert!(context.is_bound(&memory_endpoint()));
}
