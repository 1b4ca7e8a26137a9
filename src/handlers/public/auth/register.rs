// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;

use crate::api::{RegisterRequest, RegisterResponse};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::server::AppState;

/**
 * POST /api/auth/register - Create an email + password account
 *
 * Expected Input:
 * ```json
 * { "email": "a@x.com", "password": "Passw0rd", "confirmPassword": "Passw0rd" }
 * ```
 *
 * 400 when the confirmation differs, the password is shorter than six
 * characters or has no digit, or the email is malformed or already taken.
 */
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let user = state.accounts().register(body.into()).await?;
    Ok(ApiResponse::success(user.into()))
}
