//! Contract Test: Schedule
//!
//! Verifies when ticks happen.
//!
//! Constraints verified:
//! - A zero interval runs exactly one tick and returns
//! - A periodic schedule ticks immediately, then once per interval
//! - Last observed state carries over between periodic ticks
//! - Shutdown stops the loop promptly

mod common;

use common::*;
use ddns_core::{AddressFamily, DdnsEngine, Schedule};
use std::time::Duration;

#[tokio::test]
async fn zero_interval_runs_once() {
    let checker = ScriptedIpChecker::new().answer(AddressFamily::V4, "203.0.113.5");
    let client = RecordingRecordClient::new();
    let engine = DdnsEngine::new(
        Box::new(checker.clone()),
        Box::new(client.clone()),
        &config(true, false, Duration::ZERO),
    );
    assert_eq!(engine.schedule(), Schedule::Once);

    let state = tokio::time::timeout(Duration::from_secs(5), engine.run())
        .await
        .expect("single-shot run returns on its own");

    assert_eq!(state.ipv4, "203.0.113.5");
    assert_eq!(checker.calls(AddressFamily::V4), 1);
    assert_eq!(client.update_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn periodic_ticks_immediately_then_every_interval() {
    let checker = ScriptedIpChecker::new().answer(AddressFamily::V4, "203.0.113.5");
    let client = RecordingRecordClient::new();
    let engine = DdnsEngine::new(
        Box::new(checker.clone()),
        Box::new(client.clone()),
        &config(true, false, Duration::from_secs(60)),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    // Ticks at 0s, 60s and 120s.
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(checker.calls(AddressFamily::V4), 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(checker.calls(AddressFamily::V4), 4);

    shutdown_tx.send(()).unwrap();
    let state = handle.await.expect("engine task completes");

    assert_eq!(state.ipv4, "203.0.113.5");
    assert_eq!(
        client.update_count(),
        1,
        "an unchanged address is only pushed on the first tick"
    );
}

#[tokio::test(start_paused = true)]
async fn periodic_picks_up_address_change() {
    let checker = ScriptedIpChecker::new()
        .answer(AddressFamily::V4, "203.0.113.5")
        .answer(AddressFamily::V4, "203.0.113.5")
        .answer(AddressFamily::V4, "203.0.113.77");
    let client = RecordingRecordClient::new();
    let engine = DdnsEngine::new(
        Box::new(checker.clone()),
        Box::new(client.clone()),
        &config(true, false, Duration::from_secs(30)),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_secs(75)).await;
    shutdown_tx.send(()).unwrap();
    let state = handle.await.unwrap();

    assert_eq!(state.ipv4, "203.0.113.77");
    let desired: Vec<_> = client.updates().into_iter().map(|c| c.desired).collect();
    assert_eq!(desired, vec!["203.0.113.5", "203.0.113.77"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_periodic_loop() {
    let checker = ScriptedIpChecker::new().answer(AddressFamily::V4, "203.0.113.5");
    let client = RecordingRecordClient::new();
    let engine = DdnsEngine::new(
        Box::new(checker.clone()),
        Box::new(client.clone()),
        &config(true, false, Duration::from_secs(3600)),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        engine
            .run_until(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "engine should stop well before the next tick");
    assert_eq!(checker.calls(AddressFamily::V4), 1);
}
