use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TripEntry {
    pub id: i32,
    pub owner_user_id: String,
    /// Set to `None` when the referenced project is deleted.
    pub project_id: Option<i32>,
    pub date: NaiveDate,
    pub start_address: String,
    pub end_address: String,
    pub distance_km: Decimal,
    pub purpose: Option<String>,
}

impl TripEntry {
    pub fn is_owned_by(&self, owner_user_id: &str) -> bool {
        self.owner_user_id == owner_user_id
    }
}

/// Owner-editable trip fields, shared by insert and update.
#[derive(Debug, Clone)]
pub struct TripFields {
    pub project_id: Option<i32>,
    pub date: NaiveDate,
    pub start_address: String,
    pub end_address: String,
    pub distance_km: Decimal,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTripEntry {
    pub owner_user_id: String,
    pub fields: TripFields,
}
