// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (bearer token required). The operational
// endpoints `/` and `/health` live here.

pub mod protected; // Bearer token required (/api/projecten, /api/tijd, /api/ritten)
pub mod public; // No authentication required (/api/auth/*)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::Store;
use crate::server::AppState;

/// GET / - service name and version
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Tijdkaart API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth/register, /api/auth/login (public)",
            "projects": "/api/projecten[/:id] (protected)",
            "time_entries": "/api/tijd, /api/tijd/:id/stop, /api/tijd/project/:projectId (protected)",
            "trips": "/api/ritten[/:id] (protected)",
        }
    }))
}

/// GET /health - 503 while the store is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
