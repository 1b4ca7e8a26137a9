// handlers/protected/trips.rs - /api/ritten handlers

use axum::extract::State;

use crate::api::{TripDto, TripRequest};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::server::AppState;

/// GET /api/ritten - the caller's trips, newest datum first
pub async fn list(State(state): State<AppState>, CurrentUser(owner): CurrentUser) -> ApiResult<Vec<TripDto>> {
    let trips = state.trips().list_for_owner(&owner).await?;
    Ok(ApiResponse::success(trips.into_iter().map(TripDto::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiJson(body): ApiJson<TripRequest>,
) -> ApiResult<TripDto> {
    let trip = state.trips().create(&owner, body.into()).await?;
    let location = format!("/api/ritten/{}", trip.id);
    Ok(ApiResponse::created(trip.into(), location))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<TripRequest>,
) -> ApiResult<TripDto> {
    let trip = state.trips().update(&owner, id, body.into()).await?;
    Ok(ApiResponse::success(trip.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    state.trips().delete(&owner, id).await?;
    Ok(ApiResponse::no_content())
}
