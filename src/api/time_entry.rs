use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::TimeEntryView;
use crate::services::StartTimeEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryDto {
    pub id: i32,
    pub project_id: i32,
    pub project_naam: String,
    pub user_id: String,
    pub start_tijd: DateTime<Utc>,
    pub end_tijd: Option<DateTime<Utc>>,
    pub duur_in_minuten: i32,
    pub omschrijving: Option<String>,
}

impl From<TimeEntryView> for TimeEntryDto {
    fn from(view: TimeEntryView) -> Self {
        let entry = view.entry;
        TimeEntryDto {
            id: entry.id,
            project_id: entry.project_id,
            project_naam: view.project_name,
            user_id: entry.owner_user_id,
            start_tijd: entry.start_time,
            end_tijd: entry.end_time,
            duur_in_minuten: entry.duration_minutes,
            omschrijving: entry.description,
        }
    }
}

/// `startTijd` is RFC 3339 with any offset; it is stored in UTC.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimeEntryRequest {
    pub project_id: i32,
    pub start_tijd: DateTime<Utc>,
    #[serde(default)]
    pub omschrijving: Option<String>,
}

impl From<StartTimeEntryRequest> for StartTimeEntry {
    fn from(req: StartTimeEntryRequest) -> Self {
        StartTimeEntry {
            project_id: req.project_id,
            start_time: req.start_tijd,
            description: req.omschrijving,
        }
    }
}
