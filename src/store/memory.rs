//! In-memory Store backend: used by unit/integration tests and as a dependency-free fallback.
//!
//! Unlike a ring-buffer cache, every operation here is fully functional -- this backend is
//! load-bearing for tests, not a documented-limitation placeholder.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::Store;
use crate::{check_key, Check, LogEntry, Project, SELF_HEALTH_CHECK_NAME, SELF_HEALTH_PROJECT_ID};

#[derive(Default)]
struct Inner {
    projects: HashMap<String, Project>,
    checks: HashMap<String, Check>,
    logs: Vec<LogEntry>,
    next_log_id: i64,
    settings: HashMap<String, String>,
}

pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_project(&self, project_id: &str) -> StoreResult<Option<Project>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.projects.get(project_id).cloned())
    }

    async fn get_project_by_token(&self, token: &str) -> StoreResult<Option<Project>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.projects.values().find(|p| p.token == token).cloned())
    }

    async fn upsert_project(&self, project: &Project) -> StoreResult<()> {
        let mut inner = self.inner.write().unwrap();
        inner.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.projects.values().cloned().collect())
    }

    async fn get_check(&self, project_id: &str, name: &str) -> StoreResult<Option<Check>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.checks.get(&check_key(project_id, name)).cloned())
    }

    async fn list_checks_for_project(&self, project_id: &str) -> StoreResult<Vec<Check>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .checks
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn list_overdue_heartbeats(&self, now: i64) -> StoreResult<Vec<Check>> {
        let self_health_key = check_key(SELF_HEALTH_PROJECT_ID, SELF_HEALTH_CHECK_NAME);
        let inner = self.inner.read().unwrap();
        Ok(inner
            .checks
            .values()
            .filter(|c| c.check_id() != self_health_key && c.is_overdue(now))
            .cloned()
            .collect())
    }

    async fn upsert_check_rules(&self, check: &Check) -> StoreResult<()> {
        let key = check.check_id();
        let mut inner = self.inner.write().unwrap();
        match inner.checks.get_mut(&key) {
            Some(existing) => {
                existing.display_name = check.display_name.clone();
                existing.check_type = check.check_type;
                existing.interval = check.interval;
                existing.grace = check.grace;
                existing.threshold = check.threshold;
                existing.cooldown = check.cooldown;
                existing.monitor = check.monitor;
            }
            None => {
                inner.checks.insert(key, check.clone());
            }
        }
        Ok(())
    }

    async fn compare_and_swap_check(&self, check: &Check) -> StoreResult<bool> {
        let key = check.check_id();
        let mut inner = self.inner.write().unwrap();
        let current_version = inner.checks.get(&key).map(|c| c.version);
        match current_version {
            Some(v) if v == check.version => {
                let mut next = check.clone();
                next.version += 1;
                inner.checks.insert(key, next);
                Ok(true)
            }
            Some(_) => {
                debug!("compare-and-swap conflict for check {key}");
                Ok(false)
            }
            None => Err(StoreError::NotFound(format!("check {key}"))),
        }
    }

    async fn append_log(&self, entry: &LogEntry) -> StoreResult<()> {
        let mut inner = self.inner.write().unwrap();
        let id = inner.next_log_id;
        inner.next_log_id += 1;
        let mut entry = entry.clone();
        entry.id = Some(id);
        inner.logs.push(entry);
        Ok(())
    }

    async fn prune_logs_before(&self, before: i64) -> StoreResult<u64> {
        let mut inner = self.inner.write().unwrap();
        let before_len = inner.logs.len();
        inner.logs.retain(|l| l.created_at >= before);
        Ok((before_len - inner.logs.len()) as u64)
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.settings.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str, _now: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().unwrap();
        inner.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
