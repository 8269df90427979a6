//! Request/response bodies for the HTTP API (§6).

use serde::{Deserialize, Serialize};

use crate::{CheckStatus, CheckType};

#[derive(Debug, Clone, Deserialize)]
pub struct PulseBody {
    pub project_id: Option<String>,
    pub check_name: String,
    #[serde(default)]
    pub status: Option<PulseStatus>,
    pub message: Option<String>,
    pub latency: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct PulseResponse {
    pub success: bool,
    pub check_id: String,
    pub status: CheckStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigBody {
    pub project_id: String,
    pub display_name: String,
    pub checks: Vec<ConfigCheckBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigCheckBody {
    pub name: String,
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub check_type: CheckType,
    pub interval: Option<i64>,
    pub grace: Option<i64>,
    pub threshold: Option<i64>,
    pub cooldown: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub project_id: String,
    pub checks_registered: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MaintenanceBody {
    pub duration: Option<i64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    pub success: bool,
    pub project_id: String,
    pub maintenance_until: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub projects: Vec<ProjectStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatus {
    pub project_id: String,
    pub display_name: String,
    pub maintenance_until: i64,
    pub checks: Vec<CheckStatusView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckStatusView {
    pub name: String,
    pub display_name: Option<String>,
    pub check_type: CheckType,
    pub status: CheckStatus,
    pub last_seen: i64,
    pub failure_count: i64,
    pub monitor: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickResponse {
    pub checked: usize,
    pub marked_dead: usize,
    pub alerts_sent: usize,
    pub logs_pruned: u64,
}
