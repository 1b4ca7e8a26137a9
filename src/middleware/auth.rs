use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{current_user_id, Principal, TokenService};
use crate::error::ApiError;

/// Bearer token middleware for the protected routes.
///
/// Validates signature, issuer, audience and expiry, then stores the
/// resulting [`Principal`] in the request extensions.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;

    let principal = tokens.validate(token).map_err(|err| {
        tracing::debug!("Rejected bearer token: {}", err);
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers.get(AUTHORIZATION).ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

/// The owner id of the authenticated caller.
///
/// Rejects with 401 when no principal is attached or the validated token
/// carries neither a name-identifier nor a `sub` claim.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        current_user_id(principal)
            .map(|id| CurrentUser(id.to_string()))
            .ok_or_else(|| ApiError::unauthorized("Token does not identify a user"))
    }
}
