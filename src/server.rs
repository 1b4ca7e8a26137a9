//! Router assembly and shared request state.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use mockable::Clock;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers;
use crate::middleware::require_bearer;
use crate::services::{AccountService, ProjectService, TimeEntryService, TripService};

/// Everything a handler may need, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn Store>,
    accounts: AccountService,
    projects: ProjectService,
    time_entries: TimeEntryService,
    trips: TripService,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        tokens: Arc<TokenService>,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), tokens.clone(), clock.clone()),
            projects: ProjectService::new(store.clone()),
            time_entries: TimeEntryService::new(store.clone(), clock),
            trips: TripService::new(store.clone()),
            config,
            tokens,
            store,
        }
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn time_entries(&self) -> &TimeEntryService {
        &self.time_entries
    }

    pub fn trips(&self) -> &TripService {
        &self.trips
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);
    let body_limit = RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes);

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(&state))
        // Global middleware
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register_post))
        .route("/api/auth/login", post(auth::login_post))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::{projects, time_entries, trips};

    Router::new()
        .route("/api/projecten", get(projects::list).post(projects::create))
        .route("/api/projecten/:id", put(projects::update).delete(projects::delete))
        .route("/api/tijd", get(time_entries::list).post(time_entries::start))
        .route("/api/tijd/:id/stop", put(time_entries::stop))
        .route("/api/tijd/project/:project_id", get(time_entries::list_for_project))
        .route("/api/ritten", get(trips::list).post(trips::create))
        .route("/api/ritten/:id", put(trips::update).delete(trips::delete))
        .route_layer(from_fn_with_state(state.tokens.clone(), require_bearer))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
