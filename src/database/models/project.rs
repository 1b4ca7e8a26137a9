use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub client_name: Option<String>,
    pub hourly_rate: Decimal,
    pub is_active: bool,
    pub owner_user_id: String,
}

impl Project {
    pub fn is_owned_by(&self, owner_user_id: &str) -> bool {
        self.owner_user_id == owner_user_id
    }
}

/// Insert payload. `is_active` is always true for new projects.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub client_name: Option<String>,
    pub hourly_rate: Decimal,
    pub owner_user_id: String,
}

/// The fields an owner may replace. Id and owner are fixed.
#[derive(Debug, Clone)]
pub struct ProjectChanges {
    pub name: String,
    pub client_name: Option<String>,
    pub hourly_rate: Decimal,
}
