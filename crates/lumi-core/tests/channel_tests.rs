//! Tests for event delivery across the UI connection.
//!
//! These tests verify that events emitted around the moment the UI
//! connects are delivered exactly once and in emission order.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use lumi_core::channel::{BroadcastEndpoint, DeferredEventChannel, QueuedEvent};
use lumi_core::config::ExportConfig;
use lumi_core::content::DirectoryContentEngine;
use lumi_core::controller::{LumiController, IMPORT_FINISHED_EVENT};
use lumi_core::pickers::PresetPickers;
use serde_json::json;
use tokio::sync::mpsc;

use common::{create_package_file, create_temp_dir};

async fn next(rx: &mut mpsc::UnboundedReceiver<QueuedEvent>) -> QueuedEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("event delivered in time")
        .expect("channel open")
}

/// Events emitted concurrently with the connection are neither lost nor
/// duplicated, and each producer's events keep their order.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_emits_exactly_once() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 100;

    let endpoint = Arc::new(BroadcastEndpoint::default());
    let channel = DeferredEventChannel::with_endpoint(endpoint.clone());

    let mut producers = Vec::new();
    for producer in 0..PRODUCERS {
        let channel = channel.clone();
        producers.push(tokio::spawn(async move {
            for seq in 0..PER_PRODUCER {
                channel.emit(format!("p{producer}"), vec![json!(seq)]);
                if seq % 10 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }

    let mut rx = endpoint.subscribe();
    for producer in producers {
        producer.await.unwrap();
    }

    let mut seen = HashSet::new();
    let mut last_seq = vec![None::<u64>; PRODUCERS];
    for _ in 0..PRODUCERS * PER_PRODUCER {
        let event = next(&mut rx).await;
        let producer: usize = event.name[1..].parse().unwrap();
        let seq = event.payload[0].as_u64().unwrap();

        assert!(seen.insert((producer, seq)), "duplicate {event:?}");
        if let Some(last) = last_seq[producer] {
            assert!(seq > last, "p{producer} out of order: {seq} after {last}");
        }
        last_seq[producer] = Some(seq);
    }

    assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);
    assert!(rx.try_recv().is_err());
    assert_eq!(channel.queued_len(), 0);
}

/// A backlog far larger than any single burst reaches the UI in full.
#[tokio::test]
async fn test_large_backlog_delivered_in_order() {
    const QUEUED: u64 = 2_000;

    let endpoint = Arc::new(BroadcastEndpoint::default());
    let channel = DeferredEventChannel::with_endpoint(endpoint.clone());
    for seq in 0..QUEUED {
        channel.emit("import-progress", vec![json!(seq)]);
    }
    assert_eq!(channel.queued_len(), QUEUED as usize);

    let mut rx = endpoint.subscribe();
    for seq in 0..QUEUED {
        assert_eq!(next(&mut rx).await.payload[0], json!(seq));
    }

    channel.emit("import-finished", vec![]);
    assert_eq!(next(&mut rx).await.name, "import-finished");
    assert!(rx.try_recv().is_err());
}

/// Imports finished before the UI connects are reported once it does.
#[tokio::test]
async fn test_import_events_wait_for_ui() {
    let temp_dir = create_temp_dir();
    let first = create_package_file(temp_dir.path(), "a.h5p", "First");
    let second = create_package_file(temp_dir.path(), "b.h5p", "Second");

    let endpoint = Arc::new(BroadcastEndpoint::default());
    let events = DeferredEventChannel::with_endpoint(endpoint.clone());
    let controller = LumiController::builder(
        Arc::new(DirectoryContentEngine::new(temp_dir.path().join("content"))),
        Arc::new(PresetPickers::default().with_open_paths(vec![first, second])),
    )
    .with_events(events.clone())
    .with_export_config(ExportConfig::default())
    .build();

    for picked in controller.pick_h5p_files().await.unwrap().unwrap() {
        controller.import(&picked.file_handle_id).await.unwrap();
    }
    assert_eq!(events.queued_len(), 2);

    let mut rx = endpoint.subscribe();
    let a = next(&mut rx).await;
    let b = next(&mut rx).await;

    assert_eq!(a.name, IMPORT_FINISHED_EVENT);
    assert_eq!(a.payload[0]["metadata"]["title"], "First");
    assert_eq!(b.payload[0]["metadata"]["title"], "Second");
    assert_eq!(a.payload[0]["library"], "H5P.MultiChoice 1.16");
}
