//! In-process store with the same semantics as the PostgreSQL schema.
//!
//! Backs the test suites and `--in-memory` development runs. A single
//! `RwLock` over all tables makes every repository call atomic, which is
//! what gives `close_time_entry` its compare-and-set behaviour here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    NewProject, NewTimeEntry, NewTripEntry, NewUser, Project, ProjectChanges, TimeEntry, TimeEntryView,
    TripEntry, TripFields, User,
};
use crate::database::repository::{
    ProjectRepository, Store, TimeEntryRepository, TripEntryRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: BTreeMap<i32, Project>,
    time_entries: BTreeMap<i32, TimeEntry>,
    trips: BTreeMap<i32, TripEntry>,
    last_project_id: i32,
    last_time_entry_id: i32,
    last_trip_id: i32,
}

impl Tables {
    fn view(&self, entry: &TimeEntry) -> TimeEntryView {
        let project_name = self
            .projects
            .get(&entry.project_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        TimeEntryView {
            entry: entry.clone(),
            project_name,
        }
    }

    fn user_exists(&self, id: &str) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn check_trip_project(&self, project_id: Option<i32>) -> Result<(), DatabaseError> {
        match project_id {
            Some(id) if !self.projects.contains_key(&id) => Err(DatabaseError::ForeignKeyViolation(format!(
                "project {id} does not exist"
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(DatabaseError::UniqueViolation(format!("email {} already exists", input.email)));
        }
        let user = User {
            id: input.id,
            email: input.email,
            password_hash: input.password_hash,
            created_at: input.created_at,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn list_projects_for_owner(&self, owner_user_id: &str) -> Result<Vec<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .values()
            .filter(|p| p.is_owned_by(owner_user_id))
            .cloned()
            .collect())
    }

    async fn find_project(&self, id: i32) -> Result<Option<Project>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.get(&id).cloned())
    }

    async fn insert_project(&self, input: NewProject) -> Result<Project, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(&input.owner_user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "user {} does not exist",
                input.owner_user_id
            )));
        }
        tables.last_project_id += 1;
        let project = Project {
            id: tables.last_project_id,
            name: input.name,
            client_name: input.client_name,
            hourly_rate: input.hourly_rate,
            is_active: true,
            owner_user_id: input.owner_user_id,
        };
        tables.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: i32, changes: ProjectChanges) -> Result<Option<Project>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.projects.get_mut(&id).map(|project| {
            project.name = changes.name;
            project.client_name = changes.client_name;
            project.hourly_rate = changes.hourly_rate;
            project.clone()
        }))
    }

    async fn delete_project(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&id).is_none() {
            return Ok(false);
        }
        tables.time_entries.retain(|_, entry| entry.project_id != id);
        for trip in tables.trips.values_mut() {
            if trip.project_id == Some(id) {
                trip.project_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl TimeEntryRepository for MemoryStore {
    async fn insert_time_entry(&self, input: NewTimeEntry) -> Result<TimeEntryView, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&input.project_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "project {} does not exist",
                input.project_id
            )));
        }
        if !tables.user_exists(&input.owner_user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "user {} does not exist",
                input.owner_user_id
            )));
        }
        tables.last_time_entry_id += 1;
        let entry = TimeEntry {
            id: tables.last_time_entry_id,
            project_id: input.project_id,
            owner_user_id: input.owner_user_id,
            start_time: input.start_time,
            end_time: None,
            duration_minutes: 0,
            description: input.description,
        };
        tables.time_entries.insert(entry.id, entry.clone());
        Ok(tables.view(&entry))
    }

    async fn find_time_entry(&self, id: i32) -> Result<Option<TimeEntryView>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.time_entries.get(&id).map(|entry| tables.view(entry)))
    }

    async fn close_time_entry(
        &self,
        id: i32,
        end_time: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<Option<TimeEntryView>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let closed = match tables.time_entries.get_mut(&id) {
            Some(entry) if entry.is_running() => {
                entry.end_time = Some(end_time);
                entry.duration_minutes = duration_minutes;
                entry.clone()
            }
            _ => return Ok(None),
        };
        Ok(Some(tables.view(&closed)))
    }

    async fn list_time_entries(
        &self,
        owner_user_id: &str,
        project_id: Option<i32>,
    ) -> Result<Vec<TimeEntryView>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut views: Vec<TimeEntryView> = tables
            .time_entries
            .values()
            .filter(|e| e.is_owned_by(owner_user_id))
            .filter(|e| project_id.map_or(true, |pid| e.project_id == pid))
            .map(|e| tables.view(e))
            .collect();
        views.sort_by(|a, b| {
            b.entry
                .start_time
                .cmp(&a.entry.start_time)
                .then_with(|| b.entry.id.cmp(&a.entry.id))
        });
        Ok(views)
    }
}

#[async_trait]
impl TripEntryRepository for MemoryStore {
    async fn list_trips_for_owner(&self, owner_user_id: &str) -> Result<Vec<TripEntry>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut trips: Vec<TripEntry> = tables
            .trips
            .values()
            .filter(|t| t.is_owned_by(owner_user_id))
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(trips)
    }

    async fn find_trip(&self, id: i32) -> Result<Option<TripEntry>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.trips.get(&id).cloned())
    }

    async fn insert_trip(&self, input: NewTripEntry) -> Result<TripEntry, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(&input.owner_user_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "user {} does not exist",
                input.owner_user_id
            )));
        }
        tables.check_trip_project(input.fields.project_id)?;
        tables.last_trip_id += 1;
        let TripFields {
            project_id,
            date,
            start_address,
            end_address,
            distance_km,
            purpose,
        } = input.fields;
        let trip = TripEntry {
            id: tables.last_trip_id,
            owner_user_id: input.owner_user_id,
            project_id,
            date,
            start_address,
            end_address,
            distance_km,
            purpose,
        };
        tables.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn update_trip(&self, id: i32, fields: TripFields) -> Result<Option<TripEntry>, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_trip_project(fields.project_id)?;
        Ok(tables.trips.get_mut(&id).map(|trip| {
            trip.project_id = fields.project_id;
            trip.date = fields.date;
            trip.start_address = fields.start_address;
            trip.end_address = fields.end_address;
            trip.distance_km = fields.distance_km;
            trip.purpose = fields.purpose;
            trip.clone()
        }))
    }

    async fn delete_trip(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.trips.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
