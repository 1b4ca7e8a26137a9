use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::database::models::{NewTripEntry, TripEntry, TripFields};
use crate::database::{DatabaseError, ProjectRepository, Store, TripEntryRepository};
use crate::services::{missing_reference, optional_text, required_text, ServiceError, ServiceResult};

pub const MAX_ADDRESS_CHARS: usize = 300;
pub const MAX_PURPOSE_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct TripInput {
    pub project_id: Option<i32>,
    pub date: NaiveDate,
    pub start_address: String,
    pub end_address: String,
    pub distance_km: Decimal,
    pub purpose: Option<String>,
}

impl TripInput {
    fn validated(self) -> ServiceResult<TripFields> {
        let start_address = required_text("startAdres", &self.start_address, MAX_ADDRESS_CHARS)?;
        let end_address = required_text("eindAdres", &self.end_address, MAX_ADDRESS_CHARS)?;
        if self.distance_km.is_sign_negative() && !self.distance_km.is_zero() {
            return Err(ServiceError::field("geredenKilometers", "geredenKilometers may not be negative"));
        }
        let purpose = optional_text("doel", self.purpose.as_deref(), MAX_PURPOSE_CHARS)?;

        Ok(TripFields {
            project_id: self.project_id,
            date: self.date,
            start_address,
            end_address,
            distance_km: self.distance_km,
            purpose,
        })
    }
}

/// Mileage records, with the same ownership rules as projects.
#[derive(Clone)]
pub struct TripService {
    store: Arc<dyn Store>,
}

impl TripService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Newest date first.
    pub async fn list_for_owner(&self, owner_user_id: &str) -> ServiceResult<Vec<TripEntry>> {
        Ok(self.store.list_trips_for_owner(owner_user_id).await?)
    }

    pub async fn create(&self, owner_user_id: &str, input: TripInput) -> ServiceResult<TripEntry> {
        let fields = input.validated()?;
        self.ensure_project_exists(fields.project_id).await?;
        let project_id = fields.project_id;

        let inserted = self
            .store
            .insert_trip(NewTripEntry {
                owner_user_id: owner_user_id.to_string(),
                fields,
            })
            .await;
        let trip = match inserted {
            Ok(trip) => trip,
            Err(DatabaseError::ForeignKeyViolation(_)) => {
                return Err(missing_reference(self.store.as_ref(), project_id).await)
            }
            Err(other) => return Err(other.into()),
        };

        info!(owner = owner_user_id, trip_id = trip.id, "trip created");
        Ok(trip)
    }

    pub async fn update(&self, owner_user_id: &str, trip_id: i32, input: TripInput) -> ServiceResult<TripEntry> {
        self.owned_trip(owner_user_id, trip_id).await?;
        let fields = input.validated()?;
        self.ensure_project_exists(fields.project_id).await?;
        let project_id = fields.project_id;

        let updated = match self.store.update_trip(trip_id, fields).await {
            Ok(updated) => updated,
            Err(DatabaseError::ForeignKeyViolation(_)) => {
                return Err(missing_reference(self.store.as_ref(), project_id).await)
            }
            Err(other) => return Err(other.into()),
        };
        let trip = updated.ok_or_else(|| trip_not_found(trip_id))?;

        info!(owner = owner_user_id, trip_id, "trip updated");
        Ok(trip)
    }

    pub async fn delete(&self, owner_user_id: &str, trip_id: i32) -> ServiceResult<()> {
        self.owned_trip(owner_user_id, trip_id).await?;

        if !self.store.delete_trip(trip_id).await? {
            return Err(trip_not_found(trip_id));
        }

        info!(owner = owner_user_id, trip_id, "trip deleted");
        Ok(())
    }

    async fn owned_trip(&self, owner_user_id: &str, trip_id: i32) -> ServiceResult<TripEntry> {
        let trip = self
            .store
            .find_trip(trip_id)
            .await?
            .ok_or_else(|| trip_not_found(trip_id))?;

        if !trip.is_owned_by(owner_user_id) {
            warn!(caller = owner_user_id, trip_id, "trip access denied");
            return Err(ServiceError::Forbidden("You do not have access to this trip".to_string()));
        }
        Ok(trip)
    }

    async fn ensure_project_exists(&self, project_id: Option<i32>) -> ServiceResult<()> {
        match project_id {
            Some(id) if self.store.find_project(id).await?.is_none() => Err(project_not_found(id)),
            _ => Ok(()),
        }
    }
}

fn trip_not_found(trip_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Trip {} not found", trip_id))
}

fn project_not_found(project_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Project {} not found", project_id))
}
