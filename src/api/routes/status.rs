//! `GET /api/status` and `GET /api/status/{project_id}` (§6.4): read-only snapshots derived
//! entirely from the Store. No mutation, no transition invocation.

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::ApiState;
use crate::api::types::{CheckStatusView, ProjectStatus, StatusResponse};
use crate::{Check, Project};

fn project_status(project: Project, checks: Vec<Check>) -> ProjectStatus {
    ProjectStatus {
        project_id: project.id,
        display_name: project.display_name,
        maintenance_until: project.maintenance_until,
        checks: checks
            .into_iter()
            .map(|c| CheckStatusView {
                name: c.name,
                display_name: c.display_name,
                check_type: c.check_type,
                status: c.status,
                last_seen: c.last_seen,
                failure_count: c.failure_count,
                monitor: c.monitor,
            })
            .collect(),
    }
}

/// GET /api/status
pub async fn get_status(State(state): State<ApiState>) -> ApiResult<Json<StatusResponse>> {
    let projects = state.store.list_projects().await?;
    let mut snapshots = Vec::with_capacity(projects.len());
    for project in projects {
        let checks = state.store.list_checks_for_project(&project.id).await?;
        snapshots.push(project_status(project, checks));
    }
    Ok(Json(StatusResponse { projects: snapshots }))
}

/// GET /api/status/{project_id}
pub async fn get_project_status(
    State(state): State<ApiState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let project = state
        .store
        .get_project(&project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {project_id}")))?;
    let checks = state.store.list_checks_for_project(&project.id).await?;
    Ok(Json(StatusResponse {
        projects: vec![project_status(project, checks)],
    }))
}
