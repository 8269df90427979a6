//! The Store (§2, §6.6): persists projects, checks, and logs; exposes row read/upsert/
//! conditional update. Treated by the rest of the core as a relational, key/range-queryable
//! store with atomic single-row updates -- the concrete backend is swappable behind this trait.

pub mod error;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;
pub mod memory;

pub use error::{StoreError, StoreResult};

use async_trait::async_trait;

use crate::{Check, LogEntry, Project};

/// Everything above the Store is generic over this trait, so tests can run against
/// [`memory::InMemoryStore`] and production against [`sqlite::SqliteStore`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_project(&self, project_id: &str) -> StoreResult<Option<Project>>;

    /// Look up the unique project whose token matches -- used when a pulse omits `project_id`
    /// (§4.2).
    async fn get_project_by_token(&self, token: &str) -> StoreResult<Option<Project>>;

    async fn upsert_project(&self, project: &Project) -> StoreResult<()>;

    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    async fn get_check(&self, project_id: &str, name: &str) -> StoreResult<Option<Check>>;

    async fn list_checks_for_project(&self, project_id: &str) -> StoreResult<Vec<Check>>;

    /// Overdue heartbeat checks, per the §4.3 selection predicate; excludes the self-health
    /// check.
    async fn list_overdue_heartbeats(&self, now: i64) -> StoreResult<Vec<Check>>;

    /// Insert-or-update a check's rule attributes (Config Upserter). When the row is new, state
    /// attributes are initialized per §4.6; when it exists, only rule attributes are written.
    async fn upsert_check_rules(&self, check: &Check) -> StoreResult<()>;

    /// Write back a check row whose `version` the caller read, only if the stored version still
    /// matches. On success, the stored row's version is incremented and `Ok(true)` is returned;
    /// on a lost race, `Ok(false)` (§5, §9).
    async fn compare_and_swap_check(&self, check: &Check) -> StoreResult<bool>;

    async fn append_log(&self, entry: &LogEntry) -> StoreResult<()>;

    /// Delete log rows older than `before`; returns the number of rows removed.
    async fn prune_logs_before(&self, before: i64) -> StoreResult<u64>;

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set_setting(&self, key: &str, value: &str, now: i64) -> StoreResult<()>;
}

/// Bounded retry for the compare-and-swap write-back discipline described in §5/§9: re-read,
/// recompute, and re-attempt the write at most `max_retries` additional times after the first
/// attempt.
pub const MAX_CAS_RETRIES: u32 = 2;
