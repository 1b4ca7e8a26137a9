use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::auth::TokenService;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::NewUser;
use crate::database::{MemoryStore, Store, UserRepository};
use crate::server::{app, AppState};
use crate::services::{ProjectInput, StartTimeEntry};

pub const TEST_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// Development preset with a valid signing secret.
pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn test_security_config() -> SecurityConfig {
    test_config().security
}

/// Fixed reference instant, 2024-03-01T09:00:00Z.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn whole_second_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.lock_clock();
        *guard += by;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// An [`AppState`] over a fresh [`MemoryStore`] and a [`MutableClock`].
///
/// The clock starts at the current wall-clock second, since token expiry is
/// checked against real time.
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<MutableClock>,
}

impl TestContext {
    pub async fn new() -> Self {
        let config = test_config();
        let tokens = TokenService::new(&config.security).expect("token service");
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MutableClock::new(whole_second_now()));

        let state = AppState::new(
            Arc::new(config),
            Arc::new(tokens),
            store.clone() as Arc<dyn Store>,
            clock.clone() as Arc<dyn Clock + Send + Sync>,
        );
        Self { state, store, clock }
    }

    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    /// Insert a user directly and return its id.
    pub async fn user(&self, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.store
            .create_user(NewUser {
                id: id.clone(),
                email: format!("{name}@x.com"),
                password_hash: "not-a-real-hash".to_string(),
                created_at: t0(),
            })
            .await
            .expect("create user");
        id
    }

    /// A bearer token for `user_id`, valid from now.
    pub fn token_for(&self, user_id: &str) -> String {
        self.state
            .tokens
            .issue(user_id, "test@x.com", Utc::now())
            .expect("issue token")
            .token
    }

    pub async fn project(&self, owner: &str, name: &str) -> i32 {
        self.state
            .projects()
            .create(
                owner,
                ProjectInput {
                    name: name.to_string(),
                    client_name: None,
                    hourly_rate: Decimal::new(50, 0),
                },
            )
            .await
            .expect("create project")
            .id
    }

    pub async fn start_entry(&self, owner: &str, project_id: i32) -> i32 {
        self.state
            .time_entries()
            .start(
                owner,
                StartTimeEntry {
                    project_id,
                    start_time: self.clock.utc(),
                    description: None,
                },
            )
            .await
            .expect("start entry")
            .entry
            .id
    }
}
