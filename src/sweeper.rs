//! The Sweeper (§4.3, §6.5): scans for overdue heartbeats and synthesizes `dead` events, prunes
//! old logs, and pulses its own self-health check to prove the tick ran.
//!
//! Runs on an internal periodic task by default; `POST /api/tick` drives the same `sweep_once`
//! so there is exactly one sweep implementation regardless of trigger source (§6.5).

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::clock::Clock;
use crate::notifier::Notifier;
use crate::settings::SettingsProvider;
use crate::state_machine::{transition, Event, TransitionSettings};
use crate::store::{Store, MAX_CAS_RETRIES};
use crate::{Check, CheckType, LogEntry, Project, LOG_RETENTION_SECS, SELF_HEALTH_CHECK_NAME, SELF_HEALTH_PROJECT_ID};

#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub checked: usize,
    pub marked_dead: usize,
    pub alerts_sent: usize,
    pub logs_pruned: u64,
    pub errors: usize,
}

pub struct Sweeper<S: Store, N: Notifier, P: SettingsProvider, C: Clock> {
    store: Arc<S>,
    notifier: Arc<N>,
    settings: Arc<P>,
    clock: Arc<C>,
}

impl<S: Store, N: Notifier, P: SettingsProvider, C: Clock> Sweeper<S, N, P, C> {
    pub fn new(store: Arc<S>, notifier: Arc<N>, settings: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            store,
            notifier,
            settings,
            clock,
        }
    }

    /// One full sweep: overdue-heartbeat scan, log pruning, self-health pulse. Never returns an
    /// error -- per-check failures are isolated and counted, never propagated (§7).
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> SweepSummary {
        let now = self.clock.now();
        let mut summary = SweepSummary::default();

        if let Err(e) = self.ensure_self_health_registered(now).await {
            error!("failed to ensure self-health check exists: {e}");
        }

        let overdue = match self.store.list_overdue_heartbeats(now).await {
            Ok(checks) => checks,
            Err(e) => {
                error!("failed to list overdue heartbeats: {e}");
                Vec::new()
            }
        };

        for check in &overdue {
            summary.checked += 1;
            match self.mark_dead(check, now).await {
                Ok(alerted) => {
                    summary.marked_dead += 1;
                    if alerted {
                        summary.alerts_sent += 1;
                    }
                }
                Err(e) => {
                    warn!("failed to sweep check {}: {e}", check.check_id());
                    summary.errors += 1;
                }
            }
        }

        match self.store.prune_logs_before(now - LOG_RETENTION_SECS).await {
            Ok(deleted) => summary.logs_pruned = deleted,
            Err(e) => error!("failed to prune logs: {e}"),
        }

        if let Err(e) = self.pulse_self_health(now).await {
            error!("failed to pulse self-health check: {e}");
        }

        debug!(
            "sweep complete: checked={} dead={} alerts={} pruned={}",
            summary.checked, summary.marked_dead, summary.alerts_sent, summary.logs_pruned
        );
        summary
    }

    /// Run one check through the `dead` transition with bounded compare-and-swap retry. Returns
    /// whether an alert was dispatched.
    async fn mark_dead(&self, check: &Check, now: i64) -> Result<bool, crate::store::StoreError> {
        let project = self
            .store
            .get_project(&check.project_id)
            .await?
            .unwrap_or_else(|| orphan_project(&check.project_id));

        let settings = self.settings.load().await.unwrap_or_default();
        let transition_settings = TransitionSettings {
            silence_period_seconds: settings.silence_period_seconds,
        };

        let mut attempt = 0;
        loop {
            let current = match self.store.get_check(&check.project_id, &check.name).await? {
                Some(c) => c,
                None => return Ok(false),
            };

            // Re-check overdue-ness against the freshly-read row: a pulse may have recovered
            // this check between the overdue scan and this write, or between CAS retries. Without
            // this guard a stale or re-read row would still take the Dead transition and raise a
            // false-outage alert for a check that is actually healthy.
            if !current.is_overdue(now) {
                return Ok(false);
            }

            let elapsed = now - current.last_seen;
            let (next, alert) = transition(
                &current,
                &project,
                &Event::Dead { elapsed },
                &transition_settings,
                now,
            );

            match self.store.compare_and_swap_check(&next).await? {
                true => {
                    let entry = LogEntry {
                        id: None,
                        check_id: next.check_id(),
                        status: next.status,
                        latency: None,
                        message: next.last_message.clone(),
                        created_at: now,
                    };
                    if let Err(e) = self.store.append_log(&entry).await {
                        warn!("failed to append dead-check log entry: {e}");
                    }

                    let alerted = alert.is_some();
                    if let Some(alert) = alert {
                        let webhook_url = settings.channel_for(alert.level);
                        self.notifier.notify(&settings.api_token, webhook_url, &alert).await;
                    }
                    return Ok(alerted);
                }
                false => {
                    attempt += 1;
                    if attempt > MAX_CAS_RETRIES {
                        warn!("giving up on dead-check write for {} after {attempt} conflicts", check.check_id());
                        return Ok(false);
                    }
                }
            }
        }
    }

    async fn ensure_self_health_registered(&self, now: i64) -> Result<(), crate::store::StoreError> {
        if self.store.get_project(SELF_HEALTH_PROJECT_ID).await?.is_none() {
            let project = Project {
                id: SELF_HEALTH_PROJECT_ID.to_string(),
                token: String::new(),
                display_name: "Watch-Dog Sentinel".to_string(),
                maintenance_until: 0,
                created_at: now,
            };
            self.store.upsert_project(&project).await?;
        }

        if self
            .store
            .get_check(SELF_HEALTH_PROJECT_ID, SELF_HEALTH_CHECK_NAME)
            .await?
            .is_none()
        {
            let check = Check::new_with_rules(
                SELF_HEALTH_PROJECT_ID,
                SELF_HEALTH_CHECK_NAME,
                Some("Sentinel self-health".to_string()),
                CheckType::Heartbeat,
                60,
                30,
                1,
                0,
            );
            self.store.upsert_check_rules(&check).await?;
        }

        Ok(())
    }

    /// Pulses the sentinel's own self-health check so it reflects the most recent tick time
    /// (scenario 6). Bypasses the state machine entirely -- see SPEC_FULL.md §9 open question
    /// (c): there is no failure mode to transition through, only a liveness timestamp to record.
    async fn pulse_self_health(&self, now: i64) -> Result<(), crate::store::StoreError> {
        let mut attempt = 0;
        loop {
            let check = match self
                .store
                .get_check(SELF_HEALTH_PROJECT_ID, SELF_HEALTH_CHECK_NAME)
                .await?
            {
                Some(c) => c,
                None => return Ok(()),
            };

            let mut next = check.clone();
            next.last_seen = now;
            next.status = crate::CheckStatus::Ok;
            next.failure_count = 0;

            match self.store.compare_and_swap_check(&next).await? {
                true => return Ok(()),
                false => {
                    attempt += 1;
                    if attempt > MAX_CAS_RETRIES {
                        warn!("giving up on self-health pulse after {attempt} conflicts");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// A defensive fallback for a check row whose project disappeared between the overdue scan and
/// the write (e.g. a concurrent project deletion). Treated as out of maintenance.
fn orphan_project(project_id: &str) -> Project {
    Project {
        id: project_id.to_string(),
        token: String::new(),
        display_name: project_id.to_string(),
        maintenance_until: 0,
        created_at: 0,
    }
}
