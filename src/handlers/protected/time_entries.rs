// handlers/protected/time_entries.rs - /api/tijd handlers

use axum::extract::State;

use crate::api::{StartTimeEntryRequest, TimeEntryDto};
use crate::database::models::TimeEntryView;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::server::AppState;

fn to_dtos(views: Vec<TimeEntryView>) -> Vec<TimeEntryDto> {
    views.into_iter().map(TimeEntryDto::from).collect()
}

/// GET /api/tijd - the caller's entries, newest start first
pub async fn list(State(state): State<AppState>, CurrentUser(owner): CurrentUser) -> ApiResult<Vec<TimeEntryDto>> {
    let entries = state.time_entries().list_for_owner(&owner).await?;
    Ok(ApiResponse::success(to_dtos(entries)))
}

/// GET /api/tijd/project/:projectId - same, limited to one project
pub async fn list_for_project(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiPath(project_id): ApiPath<i32>,
) -> ApiResult<Vec<TimeEntryDto>> {
    let entries = state.time_entries().list_for_owner_and_project(&owner, project_id).await?;
    Ok(ApiResponse::success(to_dtos(entries)))
}

/// POST /api/tijd - start a running entry; 404 when the project is missing
pub async fn start(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiJson(body): ApiJson<StartTimeEntryRequest>,
) -> ApiResult<TimeEntryDto> {
    let entry = state.time_entries().start(&owner, body.into()).await?;
    let location = format!("/api/tijd/{}", entry.entry.id);
    Ok(ApiResponse::created(entry.into(), location))
}

/// PUT /api/tijd/:id/stop - 404, 403, or 400 once already stopped
pub async fn stop(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<TimeEntryDto> {
    let entry = state.time_entries().stop(&owner, id).await?;
    Ok(ApiResponse::success(entry.into()))
}
