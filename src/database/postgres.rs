use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    NewProject, NewTimeEntry, NewTripEntry, NewUser, Project, ProjectChanges, TimeEntryView, TripEntry,
    TripFields, User,
};
use crate::database::repository::{
    ProjectRepository, Store, TimeEntryRepository, TripEntryRepository, UserRepository,
};

const PROJECT_COLUMNS: &str = "id, name, client_name, hourly_rate, is_active, owner_user_id";

const TRIP_COLUMNS: &str =
    "id, owner_user_id, project_id, date, start_address, end_address, distance_km, purpose";

// Joined projection shared by every time entry query. `t` is the entry row source.
const TIME_ENTRY_VIEW: &str = r#"
    SELECT t.id, t.project_id, t.owner_user_id, t.start_time, t.end_time,
           t.duration_minutes, t.description, p.name AS project_name
    FROM t
    JOIN projects p ON p.id = t.project_id
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Wrap a statement producing time entry rows as `t` and join the project name.
    fn time_entry_view(source: &str) -> String {
        format!("WITH t AS ({source}) {TIME_ENTRY_VIEW}")
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(&input.id)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn list_projects_for_owner(&self, owner_user_id: &str) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_user_id = $1 ORDER BY id");
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    async fn find_project(&self, id: i32) -> Result<Option<Project>, DatabaseError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn insert_project(&self, input: NewProject) -> Result<Project, DatabaseError> {
        let sql = format!(
            "INSERT INTO projects (name, client_name, hourly_rate, is_active, owner_user_id) \
             VALUES ($1, $2, $3, TRUE, $4) RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(&input.name)
            .bind(&input.client_name)
            .bind(input.hourly_rate)
            .bind(&input.owner_user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(project)
    }

    async fn update_project(&self, id: i32, changes: ProjectChanges) -> Result<Option<Project>, DatabaseError> {
        let sql = format!(
            "UPDATE projects SET name = $2, client_name = $3, hourly_rate = $4 \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.client_name)
            .bind(changes.hourly_rate)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn delete_project(&self, id: i32) -> Result<bool, DatabaseError> {
        // ON DELETE CASCADE / SET NULL on the child tables do the rest
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TimeEntryRepository for PgStore {
    async fn insert_time_entry(&self, input: NewTimeEntry) -> Result<TimeEntryView, DatabaseError> {
        let sql = Self::time_entry_view(
            "INSERT INTO time_entries (project_id, owner_user_id, start_time, end_time, duration_minutes, description) \
             VALUES ($1, $2, $3, NULL, 0, $4) RETURNING *",
        );
        let view = sqlx::query_as::<_, TimeEntryView>(&sql)
            .bind(input.project_id)
            .bind(&input.owner_user_id)
            .bind(input.start_time)
            .bind(&input.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(view)
    }

    async fn find_time_entry(&self, id: i32) -> Result<Option<TimeEntryView>, DatabaseError> {
        let sql = Self::time_entry_view("SELECT * FROM time_entries WHERE id = $1");
        let view = sqlx::query_as::<_, TimeEntryView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(view)
    }

    async fn close_time_entry(
        &self,
        id: i32,
        end_time: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<Option<TimeEntryView>, DatabaseError> {
        // The end_time guard makes concurrent stops race on the row lock: one wins, the rest see 0 rows
        let sql = Self::time_entry_view(
            "UPDATE time_entries SET end_time = $2, duration_minutes = $3 \
             WHERE id = $1 AND end_time IS NULL RETURNING *",
        );
        let view = sqlx::query_as::<_, TimeEntryView>(&sql)
            .bind(id)
            .bind(end_time)
            .bind(duration_minutes)
            .fetch_optional(&self.pool)
            .await?;
        Ok(view)
    }

    async fn list_time_entries(
        &self,
        owner_user_id: &str,
        project_id: Option<i32>,
    ) -> Result<Vec<TimeEntryView>, DatabaseError> {
        let sql = format!(
            "{} ORDER BY t.start_time DESC, t.id DESC",
            Self::time_entry_view(
                "SELECT * FROM time_entries WHERE owner_user_id = $1 AND ($2::INTEGER IS NULL OR project_id = $2)"
            )
        );
        let views = sqlx::query_as::<_, TimeEntryView>(&sql)
            .bind(owner_user_id)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(views)
    }
}

#[async_trait]
impl TripEntryRepository for PgStore {
    async fn list_trips_for_owner(&self, owner_user_id: &str) -> Result<Vec<TripEntry>, DatabaseError> {
        let sql = format!(
            "SELECT {TRIP_COLUMNS} FROM trip_entries WHERE owner_user_id = $1 ORDER BY date DESC, id DESC"
        );
        let trips = sqlx::query_as::<_, TripEntry>(&sql)
            .bind(owner_user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(trips)
    }

    async fn find_trip(&self, id: i32) -> Result<Option<TripEntry>, DatabaseError> {
        let sql = format!("SELECT {TRIP_COLUMNS} FROM trip_entries WHERE id = $1");
        let trip = sqlx::query_as::<_, TripEntry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trip)
    }

    async fn insert_trip(&self, input: NewTripEntry) -> Result<TripEntry, DatabaseError> {
        let sql = format!(
            "INSERT INTO trip_entries (owner_user_id, project_id, date, start_address, end_address, distance_km, purpose) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {TRIP_COLUMNS}"
        );
        let fields = &input.fields;
        let trip = sqlx::query_as::<_, TripEntry>(&sql)
            .bind(&input.owner_user_id)
            .bind(fields.project_id)
            .bind(fields.date)
            .bind(&fields.start_address)
            .bind(&fields.end_address)
            .bind(fields.distance_km)
            .bind(&fields.purpose)
            .fetch_one(&self.pool)
            .await?;
        Ok(trip)
    }

    async fn update_trip(&self, id: i32, fields: TripFields) -> Result<Option<TripEntry>, DatabaseError> {
        let sql = format!(
            "UPDATE trip_entries SET project_id = $2, date = $3, start_address = $4, end_address = $5, \
             distance_km = $6, purpose = $7 WHERE id = $1 RETURNING {TRIP_COLUMNS}"
        );
        let trip = sqlx::query_as::<_, TripEntry>(&sql)
            .bind(id)
            .bind(fields.project_id)
            .bind(fields.date)
            .bind(&fields.start_address)
            .bind(&fields.end_address)
            .bind(fields.distance_km)
            .bind(&fields.purpose)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trip)
    }

    async fn delete_trip(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM trip_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
