//! The alert state machine (§4.1): a pure function of `(check, project, event, settings, now)`.
//!
//! This is the only place the threshold/cooldown/maintenance comparisons happen. It performs no
//! I/O and never suspends; callers (the Pulse Ingestor, the Sweeper) own persistence and
//! notification dispatch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Check, CheckStatus, Project};

/// An incoming event fed to [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A heartbeat or event-type pulse reporting success.
    PulseOk {
        message: Option<String>,
        latency: Option<i64>,
    },
    /// A client-reported failure.
    PulseError {
        message: Option<String>,
        latency: Option<i64>,
    },
    /// Synthesized by the Sweeper for an overdue heartbeat; `elapsed` is seconds past deadline.
    Dead { elapsed: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
    Recovery,
    /// Reserved; never emitted by this state machine (§4.4).
    Info,
}

/// The alert record produced by a transition, handed to the Notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub project_name: String,
    pub check_name: String,
    pub check_id: String,
    pub metadata: HashMap<String, String>,
}

/// Global defaults the state machine needs but does not own (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct TransitionSettings {
    pub silence_period_seconds: i64,
}

/// The effective cooldown for a check: its own `cooldown` if set, else the global default.
///
/// Precedence is explicit and never additive (§9, "Global vs per-check cooldown").
fn effective_cooldown(check: &Check, settings: &TransitionSettings) -> i64 {
    if check.cooldown > 0 {
        check.cooldown
    } else {
        settings.silence_period_seconds
    }
}

/// Whether the cooldown predicate is satisfied: never-alerted, or at least `cooldown` seconds
/// have elapsed since the last alert (P9: the boundary `now - laa == cooldown` counts as
/// satisfied).
fn cooldown_elapsed(check: &Check, now: i64, cooldown: i64) -> bool {
    check.last_alert_at == 0 || now - check.last_alert_at >= cooldown
}

/// `transition(check, project, event, settings, now) -> (check', alert?)` (§4.1).
pub fn transition(
    check: &Check,
    project: &Project,
    event: &Event,
    settings: &TransitionSettings,
    now: i64,
) -> (Check, Option<Alert>) {
    let mut next = check.clone();
    let in_maint = project.maintenance_until > now;

    match event {
        Event::PulseOk { message, latency: _ } => {
            let alert = if check.status != CheckStatus::Ok && check.failure_count >= check.threshold {
                next.last_alert_at = now;
                Some(build_alert(
                    AlertLevel::Recovery,
                    check,
                    project,
                    message.clone().unwrap_or_default(),
                    now,
                ))
            } else {
                None
            };

            next.failure_count = 0;
            next.status = CheckStatus::Ok;
            next.last_seen = now;
            next.last_message = message.clone();

            (next, alert)
        }

        Event::PulseError { message, latency: _ } => {
            next.failure_count = check.failure_count + 1;
            next.status = CheckStatus::Error;
            next.last_seen = now;
            next.last_message = message.clone();

            let cooldown = effective_cooldown(check, settings);
            let should_alert = !in_maint
                && next.failure_count >= check.threshold
                && cooldown_elapsed(check, now, cooldown);

            let alert = if should_alert {
                next.last_alert_at = now;
                Some(build_alert(
                    AlertLevel::Warning,
                    check,
                    project,
                    message.clone().unwrap_or_default(),
                    now,
                ))
            } else {
                None
            };

            (next, alert)
        }

        Event::Dead { elapsed } => {
            next.failure_count = check.failure_count + 1;
            next.status = CheckStatus::Dead;
            // last_seen is deliberately untouched (I4).
            let message = format!("heartbeat missed; last seen {elapsed}s ago");
            next.last_message = Some(message.clone());

            let cooldown = effective_cooldown(check, settings);
            let should_alert = !in_maint
                && next.failure_count >= check.threshold
                && cooldown_elapsed(check, now, cooldown);

            let alert = if should_alert {
                next.last_alert_at = now;
                Some(build_alert(AlertLevel::Critical, check, project, message, now))
            } else {
                None
            };

            (next, alert)
        }
    }
}

fn build_alert(
    level: AlertLevel,
    check: &Check,
    project: &Project,
    message: String,
    now: i64,
) -> Alert {
    let title = match level {
        AlertLevel::Critical => format!("{} is dead", check.name),
        AlertLevel::Warning => format!("{} is failing", check.name),
        AlertLevel::Recovery => format!("{} recovered", check.name),
        AlertLevel::Info => check.name.clone(),
    };

    let mut metadata = HashMap::new();
    metadata.insert("threshold".to_string(), check.threshold.to_string());
    metadata.insert("interval".to_string(), check.interval.to_string());
    metadata.insert("grace".to_string(), check.grace.to_string());
    metadata.insert("failure_count".to_string(), check.failure_count.to_string());
    metadata.insert("event_time".to_string(), now.to_string());

    Alert {
        level,
        title,
        message,
        project_name: project.display_name.clone(),
        check_name: check.name.clone(),
        check_id: check.check_id(),
        metadata,
    }
}
