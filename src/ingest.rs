//! The Pulse Ingestor (§4.2): authenticates a pulse, runs it through the state machine, and
//! commits the result with bounded compare-and-swap retry.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::clock::Clock;
use crate::notifier::Notifier;
use crate::settings::SettingsProvider;
use crate::state_machine::{transition, Alert, Event, TransitionSettings};
use crate::store::{Store, StoreError, MAX_CAS_RETRIES};
use crate::{Check, CheckStatus, LogEntry};

#[derive(Debug)]
pub enum IngestError {
    Unauthorized,
    Forbidden,
    NotFound(String),
    InvalidRequest(String),
    Conflict,
    Backend(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Unauthorized => write!(f, "unauthorized"),
            IngestError::Forbidden => write!(f, "forbidden"),
            IngestError::NotFound(what) => write!(f, "not found: {what}"),
            IngestError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            IngestError::Conflict => write!(f, "conflict"),
            IngestError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => IngestError::NotFound(what),
            StoreError::Conflict => IngestError::Conflict,
            StoreError::ConnectionFailed(msg) | StoreError::Backend(msg) => IngestError::Backend(msg),
        }
    }
}

/// A pulse as received from the wire, before the check row it targets has been looked up.
#[derive(Debug, Clone)]
pub struct PulseRequest {
    pub token: String,
    pub project_id: Option<String>,
    pub check_name: String,
    pub status_ok: bool,
    pub message: Option<String>,
    pub latency: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PulseOutcome {
    pub check_id: String,
    pub status: CheckStatus,
    pub timestamp: i64,
}

pub struct Ingestor<S: Store, N: Notifier, P: SettingsProvider, C: Clock> {
    store: Arc<S>,
    notifier: Arc<N>,
    settings: Arc<P>,
    clock: Arc<C>,
}

impl<S: Store, N: Notifier, P: SettingsProvider, C: Clock> Ingestor<S, N, P, C> {
    pub fn new(store: Arc<S>, notifier: Arc<N>, settings: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            store,
            notifier,
            settings,
            clock,
        }
    }

    /// Authenticate, transition, and commit a single pulse (§6.1, §7).
    #[instrument(skip(self, request), fields(check_name = %request.check_name))]
    pub async fn ingest(&self, request: PulseRequest) -> Result<PulseOutcome, IngestError> {
        let project = match &request.project_id {
            Some(project_id) => {
                let project = self
                    .store
                    .get_project(project_id)
                    .await?
                    .ok_or_else(|| IngestError::NotFound(format!("project {project_id}")))?;
                if project.token != request.token {
                    return Err(IngestError::Forbidden);
                }
                project
            }
            None => self
                .store
                .get_project_by_token(&request.token)
                .await?
                .ok_or(IngestError::Unauthorized)?,
        };

        let event = if request.status_ok {
            Event::PulseOk {
                message: request.message.clone(),
                latency: request.latency,
            }
        } else {
            Event::PulseError {
                message: request.message.clone(),
                latency: request.latency,
            }
        };

        let now = self.clock.now();
        let settings = self.settings.load().await?;
        let transition_settings = TransitionSettings {
            silence_period_seconds: settings.silence_period_seconds,
        };

        let mut attempt = 0;
        loop {
            let check = self
                .store
                .get_check(&project.id, &request.check_name)
                .await?
                .ok_or_else(|| IngestError::NotFound(format!("check {}", request.check_name)))?;

            let (next, alert) = transition(&check, &project, &event, &transition_settings, now);

            match self.store.compare_and_swap_check(&next).await {
                Ok(true) => {
                    self.record_log(&next, &event, now).await;
                    if let Some(alert) = alert {
                        self.dispatch(&settings, &alert).await;
                    }
                    return Ok(PulseOutcome {
                        check_id: next.check_id(),
                        status: next.status,
                        timestamp: now,
                    });
                }
                Ok(false) => {
                    attempt += 1;
                    if attempt > MAX_CAS_RETRIES {
                        warn!("giving up on pulse after {attempt} compare-and-swap conflicts");
                        return Err(IngestError::Conflict);
                    }
                    debug!("compare-and-swap conflict on attempt {attempt}, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn record_log(&self, check: &Check, event: &Event, now: i64) {
        let (status, latency, message) = match event {
            Event::PulseOk { latency, message } => (CheckStatus::Ok, *latency, message.clone()),
            Event::PulseError { latency, message } => (CheckStatus::Error, *latency, message.clone()),
            Event::Dead { .. } => (CheckStatus::Dead, None, check.last_message.clone()),
        };

        let entry = LogEntry {
            id: None,
            check_id: check.check_id(),
            status,
            latency,
            message,
            created_at: now,
        };

        if let Err(e) = self.store.append_log(&entry).await {
            warn!("failed to append log entry: {e}");
        }
    }

    async fn dispatch(&self, settings: &crate::settings::Settings, alert: &Alert) {
        let webhook_url = settings.channel_for(alert.level);
        self.notifier.notify(&settings.api_token, webhook_url, alert).await;
    }
}
