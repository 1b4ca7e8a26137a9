// handlers/protected/projects.rs - /api/projecten handlers

use axum::extract::State;

use crate::api::{ProjectDto, ProjectRequest};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::server::AppState;

/// GET /api/projecten - the caller's projects
pub async fn list(State(state): State<AppState>, CurrentUser(owner): CurrentUser) -> ApiResult<Vec<ProjectDto>> {
    let projects = state.projects().list_for_owner(&owner).await?;
    Ok(ApiResponse::success(projects.into_iter().map(ProjectDto::from).collect()))
}

/// POST /api/projecten - 201 with Location, 400 on a blank naam
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiJson(body): ApiJson<ProjectRequest>,
) -> ApiResult<ProjectDto> {
    let project = state.projects().create(&owner, body.into()).await?;
    let location = format!("/api/projecten/{}", project.id);
    Ok(ApiResponse::created(project.into(), location))
}

/// PUT /api/projecten/:id - 404, then 403, then 400
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<ProjectRequest>,
) -> ApiResult<ProjectDto> {
    let project = state.projects().update(&owner, id, body.into()).await?;
    Ok(ApiResponse::success(project.into()))
}

/// DELETE /api/projecten/:id - 204; removes the project's time entries too
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    state.projects().delete(&owner, id).await?;
    Ok(ApiResponse::no_content())
}
