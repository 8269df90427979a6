//! Watch-Dog Sentinel: a passive dead-man's-switch monitoring service.
//!
//! Monitored services emit periodic heartbeats ("pulses") to this service; when a pulse is
//! overdue or reports failure, an alert is raised through a chat-notification channel. See
//! `SPEC_FULL.md` for the full design.

pub mod clock;
pub mod config;
pub mod ingest;
pub mod notifier;
pub mod registrar;
pub mod settings;
pub mod state_machine;
pub mod store;
pub mod sweeper;

#[cfg(feature = "api")]
pub mod api;

use serde::{Deserialize, Serialize};

/// The well-known project/check pair the Sweeper pulses on every tick to prove it is alive.
pub const SELF_HEALTH_PROJECT_ID: &str = "watch-dog";
pub const SELF_HEALTH_CHECK_NAME: &str = "self-health";

/// Retention window for log rows, per §4.3.
pub const LOG_RETENTION_SECS: i64 = 7 * 24 * 60 * 60;

/// Build the canonical check key `"{project_id}:{name}"` (I5).
pub fn check_key(project_id: &str, name: &str) -> String {
    format!("{project_id}:{name}")
}

/// Split a check key back into its `(project_id, name)` components.
///
/// Bijective with [`check_key`] as long as neither component contains a colon in a way that
/// splits ambiguously; this implementation splits on the first colon, so `name` may itself
/// contain colons but `project_id` may not.
pub fn split_check_key(key: &str) -> Option<(&str, &str)> {
    let (project_id, name) = key.split_once(':')?;
    if project_id.is_empty() || name.is_empty() {
        return None;
    }
    Some((project_id, name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    Heartbeat,
    Event,
}

impl CheckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Heartbeat => "heartbeat",
            CheckType::Event => "event",
        }
    }
}

impl std::str::FromStr for CheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heartbeat" => Ok(CheckType::Heartbeat),
            "event" => Ok(CheckType::Event),
            other => Err(format!("invalid check type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
    Dead,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "ok",
            CheckStatus::Error => "error",
            CheckStatus::Dead => "dead",
        }
    }
}

impl std::str::FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(CheckStatus::Ok),
            "error" => Ok(CheckStatus::Error),
            "dead" => Ok(CheckStatus::Dead),
            other => Err(format!("invalid check status: {other}")),
        }
    }
}

/// A registered project: the authentication boundary and the maintenance-window scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub token: String,
    pub display_name: String,
    /// 0 = no maintenance window active.
    pub maintenance_until: i64,
    pub created_at: i64,
}

/// A monitored check, keyed by `(project_id, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub project_id: String,
    pub name: String,
    pub display_name: Option<String>,
    pub check_type: CheckType,

    // Rule attributes, set by the Config Upserter.
    pub interval: i64,
    pub grace: i64,
    pub threshold: i64,
    pub cooldown: i64,
    pub monitor: bool,

    // State attributes, mutated solely by the State Machine.
    pub status: CheckStatus,
    pub last_seen: i64,
    pub failure_count: i64,
    pub last_alert_at: i64,
    pub last_message: Option<String>,

    /// Optimistic-concurrency guard (§5, §9): incremented on every write.
    pub version: i64,
}

impl Check {
    pub fn check_id(&self) -> String {
        check_key(&self.project_id, &self.name)
    }

    /// A freshly-registered check's initial state, per §4.6.
    pub fn new_with_rules(
        project_id: impl Into<String>,
        name: impl Into<String>,
        display_name: Option<String>,
        check_type: CheckType,
        interval: i64,
        grace: i64,
        threshold: i64,
        cooldown: i64,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            display_name,
            check_type,
            interval,
            grace,
            threshold,
            cooldown,
            monitor: true,
            status: CheckStatus::Ok,
            last_seen: 0,
            failure_count: 0,
            last_alert_at: 0,
            last_message: None,
            version: 0,
        }
    }

    /// Whether this heartbeat check is overdue at `now` (§4.3, P10).
    pub fn is_overdue(&self, now: i64) -> bool {
        self.check_type == CheckType::Heartbeat
            && self.monitor
            && self.status != CheckStatus::Dead
            && self.last_seen + self.interval + self.grace < now
    }
}

/// An append-only per-event record (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Option<i64>,
    pub check_id: String,
    pub status: CheckStatus,
    pub latency: Option<i64>,
    pub message: Option<String>,
    pub created_at: i64,
}
