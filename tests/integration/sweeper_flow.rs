//! Sweeper tests over a real tempfile-backed SQLite store (§4.3, §8 scenarios 3, 5, 6).

use std::sync::Arc;

use watch_dog_sentinel::sweeper::Sweeper;
use watch_dog_sentinel::{Check, CheckStatus, CheckType, SELF_HEALTH_CHECK_NAME, SELF_HEALTH_PROJECT_ID};

use crate::helpers::{default_settings, fixed_clock, heartbeat_check, test_project, FixedSettingsProvider, RecordingNotifier};

#[tokio::test]
async fn scenario_3_dead_then_recovery() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    store.upsert_project(&test_project("acme", &"t".repeat(16))).await.unwrap();
    store
        .upsert_check_rules(&heartbeat_check("acme", "api", 60, 10, 1, 0))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(1000);
    let sweeper = Sweeper::new(store.clone(), notifier.clone(), settings, clock.clone());

    let summary = sweeper.sweep_once().await;
    assert_eq!(summary.marked_dead, 1);
    assert_eq!(notifier.len().await, 1);

    let check = store.get_check("acme", "api").await.unwrap().unwrap();
    assert_eq!(check.status, CheckStatus::Dead);

    let recovered = Check {
        status: CheckStatus::Ok,
        failure_count: 0,
        last_seen: 1010,
        version: check.version,
        ..check
    };
    assert!(store.compare_and_swap_check(&recovered).await.unwrap());

    clock.set(2000);
    let summary = sweeper.sweep_once().await;
    assert_eq!(summary.marked_dead, 0, "recently-recovered check is no longer overdue");
}

#[tokio::test]
async fn scenario_5_event_checks_are_never_swept() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    store.upsert_project(&test_project("acme", &"t".repeat(16))).await.unwrap();
    store
        .upsert_check_rules(&Check::new_with_rules(
            "acme",
            "deploys",
            None,
            CheckType::Event,
            60,
            10,
            1,
            0,
        ))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(1_000_000);
    let sweeper = Sweeper::new(store.clone(), notifier.clone(), settings, clock);

    let summary = sweeper.sweep_once().await;
    assert_eq!(summary.marked_dead, 0);

    let check = store.get_check("acme", "deploys").await.unwrap().unwrap();
    assert_eq!(check.status, CheckStatus::Ok);
}

#[tokio::test]
async fn scenario_6_self_health_is_registered_and_pulsed_every_sweep() {
    let (store, _dir) = crate::helpers::sqlite_store().await;

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(500);
    let sweeper = Sweeper::new(store.clone(), notifier, settings, clock.clone());

    sweeper.sweep_once().await;
    let check = store
        .get_check(SELF_HEALTH_PROJECT_ID, SELF_HEALTH_CHECK_NAME)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(check.last_seen, 500);
    assert_eq!(check.status, CheckStatus::Ok);

    clock.set(10_000_000);
    let summary = sweeper.sweep_once().await;
    assert_eq!(summary.marked_dead, 0, "self-health is excluded from the overdue scan");

    let check = store
        .get_check(SELF_HEALTH_PROJECT_ID, SELF_HEALTH_CHECK_NAME)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(check.last_seen, 10_000_000, "self-health is re-pulsed on every sweep");
}

#[tokio::test]
async fn logs_older_than_retention_are_pruned() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    store.upsert_project(&test_project("acme", &"t".repeat(16))).await.unwrap();
    store
        .upsert_check_rules(&heartbeat_check("acme", "api", 60, 10, 1, 0))
        .await
        .unwrap();

    let old_entry = watch_dog_sentinel::LogEntry {
        id: None,
        check_id: "acme:api".to_string(),
        status: CheckStatus::Ok,
        latency: None,
        message: None,
        created_at: 0,
    };
    store.append_log(&old_entry).await.unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let settings = Arc::new(FixedSettingsProvider(default_settings()));
    let clock = fixed_clock(watch_dog_sentinel::LOG_RETENTION_SECS + 10_000);
    let sweeper = Sweeper::new(store.clone(), notifier, settings, clock);

    let summary = sweeper.sweep_once().await;
    assert!(summary.logs_pruned >= 1);
}
