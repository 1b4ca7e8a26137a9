use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Account row owned by the credential store. Never mutated after registration.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    /// Stored trimmed and lower-cased; unique.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
