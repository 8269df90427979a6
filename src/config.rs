//! Application-level configuration: bind address, database path, sweep cadence, and the default
//! silence period, loaded from a JSON file and overridable from the command line.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::trace;

fn default_bind() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sentinel.db")
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_silence_period_seconds() -> i64 {
    3600
}

/// The on-disk configuration file shape. Every field is optional; missing fields fall back to
/// the defaults documented here, matching the existing configuration's tolerance for partial
/// files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind")]
    pub bind_addr: SocketAddr,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How often the internal sweep task runs, in seconds (§6.5).
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default cooldown used when a check has no per-check override (§4.5).
    #[serde(default = "default_silence_period_seconds")]
    pub silence_period_seconds: i64,

    /// Disable CORS on the HTTP API (enabled by default, matching the existing API server).
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind(),
            db_path: default_db_path(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
            log_level: default_log_level(),
            silence_period_seconds: default_silence_period_seconds(),
            enable_cors: true,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_seconds == 0 {
            return Err("sweep_interval_seconds must be at least 1".to_string());
        }
        if self.silence_period_seconds < 0 {
            return Err("silence_period_seconds must not be negative".to_string());
        }
        Ok(())
    }
}

/// Load an [`AppConfig`] from a JSON file on disk, falling back to documented defaults for any
/// field the file omits entirely.
pub fn read_config_file(path: &str) -> anyhow::Result<AppConfig> {
    let file_content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("invalid configuration file: {e}"))?;
    trace!("loaded config: {config:?}");
    Ok(config)
}
