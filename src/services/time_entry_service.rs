use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};

use crate::database::models::{NewTimeEntry, TimeEntryView};
use crate::database::{DatabaseError, ProjectRepository, Store, TimeEntryRepository};
use crate::services::{missing_reference, optional_text, ServiceError, ServiceResult};

pub const MAX_DESCRIPTION_CHARS: usize = 500;

const ALREADY_CLOSED: &str = "Time entry is already closed";

#[derive(Debug, Clone)]
pub struct StartTimeEntry {
    pub project_id: i32,
    pub start_time: DateTime<Utc>,
    pub description: Option<String>,
}

/// Start/stop state machine over time entries.
///
/// An entry is created running and transitions exactly once to stopped. The
/// stop is a conditional update at the store, so of two concurrent stops
/// only one succeeds.
#[derive(Clone)]
pub struct TimeEntryService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TimeEntryService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { store, clock }
    }

    /// Only project existence is checked, not project ownership.
    pub async fn start(&self, owner_user_id: &str, input: StartTimeEntry) -> ServiceResult<TimeEntryView> {
        if self.store.find_project(input.project_id).await?.is_none() {
            return Err(project_not_found(input.project_id));
        }
        let description = optional_text("omschrijving", input.description.as_deref(), MAX_DESCRIPTION_CHARS)?;

        let inserted = self
            .store
            .insert_time_entry(NewTimeEntry {
                project_id: input.project_id,
                owner_user_id: owner_user_id.to_string(),
                start_time: input.start_time,
                description,
            })
            .await;
        let view = match inserted {
            Ok(view) => view,
            Err(DatabaseError::ForeignKeyViolation(_)) => {
                return Err(missing_reference(self.store.as_ref(), Some(input.project_id)).await)
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            owner = owner_user_id,
            project_id = input.project_id,
            entry_id = view.entry.id,
            "time entry started"
        );
        Ok(view)
    }

    pub async fn stop(&self, owner_user_id: &str, entry_id: i32) -> ServiceResult<TimeEntryView> {
        let current = self
            .store
            .find_time_entry(entry_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Time entry {} not found", entry_id)))?;

        if !current.entry.is_owned_by(owner_user_id) {
            warn!(caller = owner_user_id, entry_id, "time entry access denied");
            return Err(ServiceError::Forbidden("You do not have access to this time entry".to_string()));
        }
        if !current.entry.is_running() {
            return Err(ServiceError::validation(ALREADY_CLOSED));
        }

        let end_time = self.clock.utc();
        let duration_minutes = elapsed_minutes(current.entry.start_time, end_time);

        let stopped = self
            .store
            .close_time_entry(entry_id, end_time, duration_minutes)
            .await?
            .ok_or_else(|| ServiceError::validation(ALREADY_CLOSED))?;

        info!(owner = owner_user_id, entry_id, duration_minutes, "time entry stopped");
        Ok(stopped)
    }

    /// Newest start first.
    pub async fn list_for_owner(&self, owner_user_id: &str) -> ServiceResult<Vec<TimeEntryView>> {
        Ok(self.store.list_time_entries(owner_user_id, None).await?)
    }

    pub async fn list_for_owner_and_project(
        &self,
        owner_user_id: &str,
        project_id: i32,
    ) -> ServiceResult<Vec<TimeEntryView>> {
        Ok(self.store.list_time_entries(owner_user_id, Some(project_id)).await?)
    }
}

/// Whole minutes between two instants, truncated.
///
/// A stop that lands before the recorded start (a client clock ahead of ours)
/// yields 0 rather than a negative duration.
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    let minutes = (end - start).num_seconds().div_euclid(60).max(0);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

fn project_not_found(project_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Project {} not found", project_id))
}
