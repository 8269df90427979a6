//! Settings Provider (§4.5): notification credentials, channel mapping, default cooldown.
//!
//! Backed by the Store's `settings(key,value,updated_at)` table. Missing keys default per the
//! values documented below; this module never writes settings, only reads (mutation is an admin
//! collaborator concern, out of core scope).

use async_trait::async_trait;

use crate::state_machine::AlertLevel;
use crate::store::{Store, StoreResult};

const KEY_API_TOKEN: &str = "api_token";
const KEY_CHANNEL_CRITICAL: &str = "channel_critical";
const KEY_CHANNEL_SUCCESS: &str = "channel_success";
const KEY_CHANNEL_WARNING: &str = "channel_warning";
const KEY_CHANNEL_INFO: &str = "channel_info";
const KEY_SILENCE_PERIOD: &str = "silence_period_seconds";

const DEFAULT_SILENCE_PERIOD_SECONDS: i64 = 3600;

/// A resolved snapshot of the settings the core reads on every notification decision.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api_token: String,
    pub channel_critical: String,
    pub channel_success: String,
    pub channel_warning: String,
    pub channel_info: String,
    pub silence_period_seconds: i64,
}

impl Settings {
    /// Resolve the channel key for an alert level, per §4.4's routing table.
    ///
    /// `warning` deliberately routes to the same destination as `critical` (distinct payload
    /// level, same channel) -- see SPEC_FULL.md §9 open question (b).
    pub fn channel_for(&self, level: AlertLevel) -> &str {
        match level {
            AlertLevel::Critical => &self.channel_critical,
            AlertLevel::Warning => &self.channel_critical,
            AlertLevel::Recovery => &self.channel_success,
            AlertLevel::Info => &self.channel_info,
        }
    }
}

/// Resolves [`Settings`] from the Store, filling in documented defaults for missing keys.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn load(&self) -> StoreResult<Settings>;
}

/// The production implementation: reads the Store's settings table directly.
pub struct StoreSettingsProvider<S: Store> {
    store: std::sync::Arc<S>,
}

impl<S: Store> StoreSettingsProvider<S> {
    pub fn new(store: std::sync::Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: Store> SettingsProvider for StoreSettingsProvider<S> {
    async fn load(&self) -> StoreResult<Settings> {
        let api_token = self.store.get_setting(KEY_API_TOKEN).await?.unwrap_or_default();
        let channel_critical = self
            .store
            .get_setting(KEY_CHANNEL_CRITICAL)
            .await?
            .unwrap_or_default();
        let channel_success = self
            .store
            .get_setting(KEY_CHANNEL_SUCCESS)
            .await?
            .unwrap_or_default();
        let channel_warning = self
            .store
            .get_setting(KEY_CHANNEL_WARNING)
            .await?
            .unwrap_or_default();
        let channel_info = self.store.get_setting(KEY_CHANNEL_INFO).await?.unwrap_or_default();
        let silence_period_seconds = self
            .store
            .get_setting(KEY_SILENCE_PERIOD)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SILENCE_PERIOD_SECONDS);

        Ok(Settings {
            api_token,
            channel_critical,
            channel_success,
            channel_warning,
            channel_info,
            silence_period_seconds,
        })
    }
}
