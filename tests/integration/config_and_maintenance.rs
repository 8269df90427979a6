//! Config Upserter tests over a real tempfile-backed SQLite store (§4.6, P6/P7).

use std::sync::Arc;

use watch_dog_sentinel::registrar::{CheckSpec, RegisterRequest, Registrar, RegistrarError};
use watch_dog_sentinel::{CheckStatus, CheckType};

use crate::helpers::fixed_clock;

fn spec(name: &str) -> CheckSpec {
    CheckSpec {
        name: name.to_string(),
        display_name: None,
        check_type: CheckType::Heartbeat,
        interval: Some(30),
        grace: Some(5),
        threshold: Some(2),
        cooldown: Some(120),
    }
}

#[tokio::test]
async fn p6_registering_twice_with_identical_rules_is_a_pure_no_op_on_state() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    let registrar = Registrar::new(store.clone(), fixed_clock(0));

    registrar
        .register(RegisterRequest {
            token: "t".repeat(16),
            project_id: "acme".to_string(),
            display_name: "Acme".to_string(),
            checks: vec![spec("api")],
        })
        .await
        .unwrap();

    // Drive the check into a failing state, as if pulses had come in.
    let mut check = store.get_check("acme", "api").await.unwrap().unwrap();
    check.status = CheckStatus::Error;
    check.failure_count = 3;
    check.last_alert_at = 90;
    store.compare_and_swap_check(&check).await.unwrap();

    registrar
        .register(RegisterRequest {
            token: "t".repeat(16),
            project_id: "acme".to_string(),
            display_name: "Acme".to_string(),
            checks: vec![spec("api")],
        })
        .await
        .unwrap();

    let after = store.get_check("acme", "api").await.unwrap().unwrap();
    assert_eq!(after.status, CheckStatus::Error, "re-registration must not reset state");
    assert_eq!(after.failure_count, 3);
    assert_eq!(after.last_alert_at, 90);
    assert_eq!(after.interval, 30, "rule attributes still update");
}

#[tokio::test]
async fn project_created_on_first_registration_keeps_token_across_repeats() {
    let (store, _dir) = crate::helpers::sqlite_store().await;
    let registrar = Registrar::new(store.clone(), fixed_clock(1000));

    let outcome = registrar
        .register(RegisterRequest {
            token: "t".repeat(16),
            project_id: "acme".to_string(),
            display_name: "Acme".to_string(),
            checks: vec![spec("api"), spec("worker")],
        })
        .await
        .unwrap();
    assert_eq!(outcome.checks_registered, 2);

    let project = store.get_project("acme").await.unwrap().unwrap();
    assert_eq!(project.token, "t".repeat(16));
    assert_eq!(project.created_at, 1000);

    let err = registrar
        .register(RegisterRequest {
            token: "someone-elses-token".to_string(),
            project_id: "acme".to_string(),
            display_name: "Acme".to_string(),
            checks: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrarError::Forbidden));
}

#[tokio::test]
async fn maintenance_window_toggle_suppresses_alerts_for_its_duration() {
    use watch_dog_sentinel::ingest::{Ingestor, PulseRequest};
    use watch_dog_sentinel::settings::Settings;

    let (store, _dir) = crate::helpers::sqlite_store().await;
    let registrar = Registrar::new(store.clone(), fixed_clock(0));
    registrar
        .register(RegisterRequest {
            token: "t".repeat(16),
            project_id: "acme".to_string(),
            display_name: "Acme".to_string(),
            checks: vec![CheckSpec {
                threshold: Some(1),
                ..spec("api")
            }],
        })
        .await
        .unwrap();

    let mut project = store.get_project("acme").await.unwrap().unwrap();
    project.maintenance_until = 3600;
    store.upsert_project(&project).await.unwrap();

    let notifier = Arc::new(crate::helpers::RecordingNotifier::new());
    let settings = Arc::new(crate::helpers::FixedSettingsProvider(Settings::default()));
    let clock = fixed_clock(10);
    let ingestor = Ingestor::new(store.clone(), notifier.clone(), settings, clock.clone());

    ingestor
        .ingest(PulseRequest {
            token: "t".repeat(16),
            project_id: Some("acme".to_string()),
            check_name: "api".to_string(),
            status_ok: false,
            message: None,
            latency: None,
        })
        .await
        .unwrap();
    assert_eq!(notifier.len().await, 0);

    let mut project = store.get_project("acme").await.unwrap().unwrap();
    project.maintenance_until = 0;
    store.upsert_project(&project).await.unwrap();

    ingestor
        .ingest(PulseRequest {
            token: "t".repeat(16),
            project_id: Some("acme".to_string()),
            check_name: "api".to_string(),
            status_ok: false,
            message: None,
            latency: None,
        })
        .await
        .unwrap();
    assert_eq!(notifier.len().await, 1, "maintenance window ended, normal alerting resumes");
}
