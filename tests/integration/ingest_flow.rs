//! End-to-end Pulse Ingestor tests over a real tempfile-backed SQLite store (§4.2, §8 scenarios).

use std::sync::Arc;

use watch_dog_sentinel::ingest::{Ingestor, PulseRequest};
use watch_dog_sentinel::CheckStatus;

use crate::helpers::{
    default_settings, fixed_clock, heartbeat_check, test_project, FixedSettingsProvider, RecordingNotifier,
};

#[tokio::test]
async fn scenario_2_threshold_met_then_cooldown() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    store.upsert_project(&test_project("acme", &"t".repeat(16))).await.unwrap();
    store
        .upsert_check_rules(&heartbeat_check("acme", "api", 60, 10, 2, 600))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(0);
    let ingestor = Ingestor::new(store.clone(), notifier.clone(), settings, clock.clone());

    let pulse = |status_ok: bool| PulseRequest {
        token: "t".repeat(16),
        project_id: Some("acme".to_string()),
        check_name: "api".to_string(),
        status_ok,
        message: None,
        latency: None,
    };

    clock.set(0);
    ingestor.ingest(pulse(false)).await.unwrap();
    assert_eq!(notifier.len().await, 0);

    clock.set(5);
    ingestor.ingest(pulse(false)).await.unwrap();
    assert_eq!(notifier.len().await, 1, "2nd consecutive failure hits threshold");

    clock.set(10);
    ingestor.ingest(pulse(false)).await.unwrap();
    assert_eq!(notifier.len().await, 1, "cooldown still active, no new alert");

    clock.set(700);
    ingestor.ingest(pulse(false)).await.unwrap();
    assert_eq!(notifier.len().await, 2, "cooldown elapsed, re-alerts");

    let check = store.get_check("acme", "api").await.unwrap().unwrap();
    assert_eq!(check.status, CheckStatus::Error);
    assert_eq!(check.last_alert_at, 700);
}

#[tokio::test]
async fn scenario_4_maintenance_suppression() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    let mut project = test_project("acme", &"t".repeat(16));
    project.maintenance_until = 500;
    store.upsert_project(&project).await.unwrap();
    store
        .upsert_check_rules(&heartbeat_check("acme", "api", 60, 10, 1, 0))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(100);
    let ingestor = Ingestor::new(store.clone(), notifier.clone(), settings, clock.clone());

    let pulse = PulseRequest {
        token: "t".repeat(16),
        project_id: Some("acme".to_string()),
        check_name: "api".to_string(),
        status_ok: false,
        message: None,
        latency: None,
    };

    ingestor.ingest(pulse.clone()).await.unwrap();
    assert_eq!(notifier.len().await, 0, "inside maintenance window");

    let check = store.get_check("acme", "api").await.unwrap().unwrap();
    assert_eq!(check.failure_count, 1);
    assert_eq!(check.last_alert_at, 0);

    clock.set(600);
    ingestor.ingest(pulse).await.unwrap();
    assert_eq!(notifier.len().await, 1, "maintenance window has closed");
}

#[tokio::test]
async fn p7_replaying_an_identical_pulse_at_the_same_now_is_idempotent() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    store.upsert_project(&test_project("acme", &"t".repeat(16))).await.unwrap();
    store
        .upsert_check_rules(&heartbeat_check("acme", "api", 60, 10, 5, 300))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(42);
    let ingestor = Ingestor::new(store.clone(), notifier.clone(), settings, clock);

    let pulse = || PulseRequest {
        token: "t".repeat(16),
        project_id: Some("acme".to_string()),
        check_name: "api".to_string(),
        status_ok: true,
        message: Some("all good".to_string()),
        latency: Some(5),
    };

    ingestor.ingest(pulse()).await.unwrap();
    let first = store.get_check("acme", "api").await.unwrap().unwrap();

    ingestor.ingest(pulse()).await.unwrap();
    let second = store.get_check("acme", "api").await.unwrap().unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.failure_count, second.failure_count);
    assert_eq!(first.last_seen, second.last_seen);
    assert_eq!(first.last_message, second.last_message);
}

#[tokio::test]
async fn ingesting_for_unregistered_check_fails_not_found() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    store.upsert_project(&test_project("acme", &"t".repeat(16))).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(0);
    let ingestor = Ingestor::new(store, notifier, settings, clock);

    let err = ingestor
        .ingest(PulseRequest {
            token: "t".repeat(16),
            project_id: Some("acme".to_string()),
            check_name: "missing".to_string(),
            status_ok: true,
            message: None,
            latency: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, watch_dog_sentinel::ingest::IngestError::NotFound(_)));
}
