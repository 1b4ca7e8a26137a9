use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::TripEntry;
use crate::services::TripInput;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripDto {
    pub id: i32,
    pub user_id: String,
    pub project_id: Option<i32>,
    pub datum: NaiveDate,
    pub start_adres: String,
    pub eind_adres: String,
    pub gereden_kilometers: Decimal,
    pub doel: Option<String>,
}

impl From<TripEntry> for TripDto {
    fn from(trip: TripEntry) -> Self {
        TripDto {
            id: trip.id,
            user_id: trip.owner_user_id,
            project_id: trip.project_id,
            datum: trip.date,
            start_adres: trip.start_address,
            eind_adres: trip.end_address,
            gereden_kilometers: trip.distance_km,
            doel: trip.purpose,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    #[serde(default)]
    pub project_id: Option<i32>,
    pub datum: NaiveDate,
    #[serde(default)]
    pub start_adres: String,
    #[serde(default)]
    pub eind_adres: String,
    #[serde(default)]
    pub gereden_kilometers: Decimal,
    #[serde(default)]
    pub doel: Option<String>,
}

impl From<TripRequest> for TripInput {
    fn from(req: TripRequest) -> Self {
        TripInput {
            project_id: req.project_id,
            date: req.datum,
            start_address: req.start_adres,
            end_address: req.eind_adres,
            distance_km: req.gereden_kilometers,
            purpose: req.doel,
        }
    }
}
