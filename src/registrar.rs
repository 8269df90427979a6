//! Config Upserter (§4.6, §6.2): registers a project and its checks' rule attributes.
//!
//! Re-registering an existing project/check is idempotent in rule attributes and never touches
//! state attributes (P6) -- that guarantee lives in [`crate::store::Store::upsert_check_rules`];
//! this module only shapes the incoming request into rows and picks the documented defaults.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::clock::Clock;
use crate::store::{Store, StoreError};
use crate::{Check, CheckType, Project};

pub const DEFAULT_INTERVAL: i64 = 300;
pub const DEFAULT_GRACE: i64 = 60;
pub const DEFAULT_THRESHOLD: i64 = 1;
pub const DEFAULT_COOLDOWN: i64 = 900;

#[derive(Debug)]
pub enum RegistrarError {
    Forbidden,
    InvalidRequest(String),
    Backend(String),
}

impl fmt::Display for RegistrarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrarError::Forbidden => write!(f, "forbidden"),
            RegistrarError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            RegistrarError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for RegistrarError {}

impl From<StoreError> for RegistrarError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => RegistrarError::Backend("unexpected missing row".to_string()),
            StoreError::Conflict => RegistrarError::Backend("concurrent registration conflict".to_string()),
            StoreError::ConnectionFailed(msg) | StoreError::Backend(msg) => RegistrarError::Backend(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckSpec {
    pub name: String,
    pub display_name: Option<String>,
    pub check_type: CheckType,
    pub interval: Option<i64>,
    pub grace: Option<i64>,
    pub threshold: Option<i64>,
    pub cooldown: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub token: String,
    pub project_id: String,
    pub display_name: String,
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub project_id: String,
    pub checks_registered: usize,
}

pub struct Registrar<S: Store, C: Clock> {
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S: Store, C: Clock> Registrar<S, C> {
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Register (or update) a project and its checks' rule attributes.
    ///
    /// A project is created on first use of its id with the presented token bound as its
    /// permanent secret (§4.6); subsequent registrations for the same project must present the
    /// same token.
    #[instrument(skip(self, request), fields(project_id = %request.project_id))]
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterOutcome, RegistrarError> {
        if request.project_id.is_empty() {
            return Err(RegistrarError::InvalidRequest("project_id must not be empty".to_string()));
        }

        let now = self.clock.now();
        let project = match self.store.get_project(&request.project_id).await? {
            Some(existing) => {
                if existing.token != request.token {
                    return Err(RegistrarError::Forbidden);
                }
                Project {
                    display_name: request.display_name.clone(),
                    ..existing
                }
            }
            None => {
                info!("registering new project {}", request.project_id);
                Project {
                    id: request.project_id.clone(),
                    token: request.token.clone(),
                    display_name: request.display_name.clone(),
                    maintenance_until: 0,
                    created_at: now,
                }
            }
        };
        self.store.upsert_project(&project).await?;

        for spec in &request.checks {
            let check = Check::new_with_rules(
                &request.project_id,
                &spec.name,
                spec.display_name.clone(),
                spec.check_type,
                spec.interval.unwrap_or(DEFAULT_INTERVAL),
                spec.grace.unwrap_or(DEFAULT_GRACE),
                spec.threshold.unwrap_or(DEFAULT_THRESHOLD),
                spec.cooldown.unwrap_or(DEFAULT_COOLDOWN),
            );
            self.store.upsert_check_rules(&check).await?;
        }

        Ok(RegisterOutcome {
            project_id: request.project_id,
            checks_registered: request.checks.len(),
        })
    }
}
