// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;

use crate::api::{LoginRequest, LoginResponse};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;

/**
 * POST /api/auth/login - Authenticate and receive a bearer token
 *
 * Expected Output (Success):
 * ```json
 * { "token": "eyJhbGciOiJIUzI1NiI...", "userId": "...", "email": "a@x.com", "expiresAt": "..." }
 * ```
 *
 * 401 for an unknown email or a wrong password, without saying which.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let login = state.accounts().login(&body.email, &body.password).await?;
    Ok(ApiResponse::success(login.into()))
}
