use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A time entry is running while `end_time` is `None`; once stopped it never changes again.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TimeEntry {
    pub id: i32,
    pub project_id: i32,
    pub owner_user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// 0 while running.
    pub duration_minutes: i32,
    pub description: Option<String>,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn is_owned_by(&self, owner_user_id: &str) -> bool {
        self.owner_user_id == owner_user_id
    }
}

/// A time entry joined with the name of its project.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TimeEntryView {
    #[sqlx(flatten)]
    pub entry: TimeEntry,
    pub project_name: String,
}

#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub project_id: i32,
    pub owner_user_id: String,
    pub start_time: DateTime<Utc>,
    pub description: Option<String>,
}
