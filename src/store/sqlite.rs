//! SQLite Store backend.
//!
//! Pooled, WAL-mode connection following the same setup this codebase already uses elsewhere for
//! its SQLite-backed storage: `create_if_missing`, WAL journal mode, a busy timeout to ride out
//! lock contention, and schema versioning via `sqlx::migrate!`.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::error::{StoreError, StoreResult};
use super::Store;
use crate::{check_key, Check, CheckStatus, CheckType, LogEntry, Project};

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();
        info!("opening SQLite store at {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!("running store migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    fn row_to_check(row: &sqlx::sqlite::SqliteRow) -> StoreResult<Check> {
        let check_type: String = row.get("check_type");
        let status: String = row.get("status");

        Ok(Check {
            project_id: row.get("project_id"),
            name: row.get("name"),
            display_name: row.get("display_name"),
            check_type: check_type
                .parse::<CheckType>()
                .map_err(StoreError::Backend)?,
            interval: row.get("interval_seconds"),
            grace: row.get("grace"),
            threshold: row.get("threshold"),
            cooldown: row.get("cooldown"),
            monitor: row.get::<i64, _>("monitor") != 0,
            status: status.parse::<CheckStatus>().map_err(StoreError::Backend)?,
            last_seen: row.get("last_seen"),
            failure_count: row.get("failure_count"),
            last_alert_at: row.get("last_alert_at"),
            last_message: row.get("last_message"),
            version: row.get("version"),
        })
    }

    fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Project {
        Project {
            id: row.get("id"),
            token: row.get("token"),
            display_name: row.get("display_name"),
            maintenance_until: row.get("maintenance_until"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    #[instrument(skip(self))]
    async fn get_project(&self, project_id: &str) -> StoreResult<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Self::row_to_project(&r)))
    }

    #[instrument(skip(self, token))]
    async fn get_project_by_token(&self, token: &str) -> StoreResult<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| Self::row_to_project(&r)))
    }

    #[instrument(skip(self, project))]
    async fn upsert_project(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, token, display_name, maintenance_until, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                token = excluded.token,
                display_name = excluded.display_name,
                maintenance_until = excluded.maintenance_until,
                created_at = excluded.created_at
            "#,
        )
        .bind(&project.id)
        .bind(&project.token)
        .bind(&project.display_name)
        .bind(project.maintenance_until)
        .bind(project.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects").fetch_all(&self.pool).await?;
        Ok(rows.iter().map(Self::row_to_project).collect())
    }

    #[instrument(skip(self))]
    async fn get_check(&self, project_id: &str, name: &str) -> StoreResult<Option<Check>> {
        let row = sqlx::query("SELECT * FROM checks WHERE project_id = ? AND name = ?")
            .bind(project_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| Self::row_to_check(&r)).transpose()
    }

    async fn list_checks_for_project(&self, project_id: &str) -> StoreResult<Vec<Check>> {
        let rows = sqlx::query("SELECT * FROM checks WHERE project_id = ?")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_check).collect()
    }

    #[instrument(skip(self))]
    async fn list_overdue_heartbeats(&self, now: i64) -> StoreResult<Vec<Check>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM checks
            WHERE check_type = 'heartbeat'
              AND monitor = 1
              AND status != 'dead'
              AND last_seen + interval_seconds + grace < ?
              AND NOT (project_id = ? AND name = ?)
            "#,
        )
        .bind(now)
        .bind(crate::SELF_HEALTH_PROJECT_ID)
        .bind(crate::SELF_HEALTH_CHECK_NAME)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_check).collect()
    }

    #[instrument(skip(self, check))]
    async fn upsert_check_rules(&self, check: &Check) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO checks (
                project_id, name, display_name, check_type, interval_seconds, grace,
                threshold, cooldown, monitor, status, last_seen, failure_count,
                last_alert_at, last_message, version
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'ok', 0, 0, 0, NULL, 0)
            ON CONFLICT (project_id, name) DO UPDATE SET
                display_name = excluded.display_name,
                check_type = excluded.check_type,
                interval_seconds = excluded.interval_seconds,
                grace = excluded.grace,
                threshold = excluded.threshold,
                cooldown = excluded.cooldown,
                monitor = excluded.monitor
            "#,
        )
        .bind(&check.project_id)
        .bind(&check.name)
        .bind(&check.display_name)
        .bind(check.check_type.as_str())
        .bind(check.interval)
        .bind(check.grace)
        .bind(check.threshold)
        .bind(check.cooldown)
        .bind(check.monitor as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self, check))]
    async fn compare_and_swap_check(&self, check: &Check) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE checks SET
                status = ?,
                last_seen = ?,
                failure_count = ?,
                last_alert_at = ?,
                last_message = ?,
                version = version + 1
            WHERE project_id = ? AND name = ? AND version = ?
            "#,
        )
        .bind(check.status.as_str())
        .bind(check.last_seen)
        .bind(check.failure_count)
        .bind(check.last_alert_at)
        .bind(&check.last_message)
        .bind(&check.project_id)
        .bind(&check.name)
        .bind(check.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Distinguish "row doesn't exist" from "version mismatch" for a clearer error.
        match self.get_check(&check.project_id, &check.name).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound(check_key(&check.project_id, &check.name))),
        }
    }

    #[instrument(skip(self, entry))]
    async fn append_log(&self, entry: &LogEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO logs (check_id, status, latency, message, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.check_id)
        .bind(entry.status.as_str())
        .bind(entry.latency)
        .bind(&entry.message)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prune_logs_before(&self, before: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM logs WHERE created_at < ?")
            .bind(before)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set_setting(&self, key: &str, value: &str, now: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
