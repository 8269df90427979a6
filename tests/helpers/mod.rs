//! Shared fixtures for integration tests.

use std::sync::Arc;

use watch_dog_sentinel::clock::FixedClock;
use watch_dog_sentinel::notifier::Notifier;
use watch_dog_sentinel::settings::{Settings, SettingsProvider};
use watch_dog_sentinel::state_machine::Alert;
use watch_dog_sentinel::store::sqlite::SqliteStore;
use watch_dog_sentinel::store::StoreResult;
use watch_dog_sentinel::{Check, CheckType, Project};

use async_trait::async_trait;
use tokio::sync::Mutex;

pub async fn sqlite_store() -> (Arc<SqliteStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(dir.path().join("sentinel.db")).await.unwrap());
    (store, dir)
}

pub fn test_project(id: &str, token: &str) -> Project {
    Project {
        id: id.to_string(),
        token: token.to_string(),
        display_name: format!("{id} display name"),
        maintenance_until: 0,
        created_at: 0,
    }
}

pub fn heartbeat_check(
    project_id: &str,
    name: &str,
    interval: i64,
    grace: i64,
    threshold: i64,
    cooldown: i64,
) -> Check {
    Check::new_with_rules(
        project_id,
        name,
        None,
        CheckType::Heartbeat,
        interval,
        grace,
        threshold,
        cooldown,
    )
}

/// A notifier that records every dispatched alert instead of calling out over the network.
pub struct RecordingNotifier {
    pub calls: Mutex<Vec<(String, Alert)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, _api_token: &str, webhook_url: &str, alert: &Alert) {
        self.calls.lock().await.push((webhook_url.to_string(), alert.clone()));
    }
}

/// A settings provider returning a fixed, caller-specified snapshot.
pub struct FixedSettingsProvider(pub Settings);

#[async_trait]
impl SettingsProvider for FixedSettingsProvider {
    async fn load(&self) -> StoreResult<Settings> {
        Ok(self.0.clone())
    }
}

pub fn default_settings() -> Settings {
    Settings {
        channel_critical: "https://chat.example/critical".to_string(),
        channel_success: "https://chat.example/success".to_string(),
        channel_warning: "https://chat.example/warning".to_string(),
        channel_info: "https://chat.example/info".to_string(),
        api_token: "test-api-token".to_string(),
        silence_period_seconds: 3600,
    }
}

pub fn fixed_clock(now: i64) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(now))
}
