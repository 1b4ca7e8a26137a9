//! Repository traits for the persistence collaborator.
//!
//! Each method is one transactional unit. Ownership rules are not enforced
//! here; the services decide who may touch what and call these afterwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewProject, NewTimeEntry, NewTripEntry, NewUser, Project, ProjectChanges, TimeEntryView, TripEntry,
    TripFields, User,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`DatabaseError::UniqueViolation`] when the email is taken.
    async fn create_user(&self, input: NewUser) -> Result<User, DatabaseError>;

    /// `email` must already be normalised (trimmed, lower-case).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Projects owned by `owner_user_id`, in insertion order.
    async fn list_projects_for_owner(&self, owner_user_id: &str) -> Result<Vec<Project>, DatabaseError>;

    async fn find_project(&self, id: i32) -> Result<Option<Project>, DatabaseError>;

    async fn insert_project(&self, input: NewProject) -> Result<Project, DatabaseError>;

    /// `None` when the row vanished in the meantime.
    async fn update_project(&self, id: i32, changes: ProjectChanges) -> Result<Option<Project>, DatabaseError>;

    /// Cascades to time entries and clears `project_id` on trips.
    /// Returns whether a row was removed.
    async fn delete_project(&self, id: i32) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Fails with [`DatabaseError::ForeignKeyViolation`] if the project is gone.
    async fn insert_time_entry(&self, input: NewTimeEntry) -> Result<TimeEntryView, DatabaseError>;

    async fn find_time_entry(&self, id: i32) -> Result<Option<TimeEntryView>, DatabaseError>;

    /// Close a running entry atomically.
    ///
    /// Only succeeds while `end_time` is still unset; returns `None` when
    /// another caller closed (or deleted) the entry first.
    async fn close_time_entry(
        &self,
        id: i32,
        end_time: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<Option<TimeEntryView>, DatabaseError>;

    /// Entries owned by `owner_user_id`, newest start first, optionally limited to one project.
    async fn list_time_entries(
        &self,
        owner_user_id: &str,
        project_id: Option<i32>,
    ) -> Result<Vec<TimeEntryView>, DatabaseError>;
}

#[async_trait]
pub trait TripEntryRepository: Send + Sync {
    /// Trips owned by `owner_user_id`, newest date first.
    async fn list_trips_for_owner(&self, owner_user_id: &str) -> Result<Vec<TripEntry>, DatabaseError>;

    async fn find_trip(&self, id: i32) -> Result<Option<TripEntry>, DatabaseError>;

    async fn insert_trip(&self, input: NewTripEntry) -> Result<TripEntry, DatabaseError>;

    async fn update_trip(&self, id: i32, fields: TripFields) -> Result<Option<TripEntry>, DatabaseError>;

    async fn delete_trip(&self, id: i32) -> Result<bool, DatabaseError>;
}

/// Everything the services need from persistence.
#[async_trait]
pub trait Store: UserRepository + ProjectRepository + TimeEntryRepository + TripEntryRepository {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}
