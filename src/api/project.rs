use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::database::models::Project;
use crate::services::ProjectInput;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: i32,
    pub naam: String,
    pub klantnaam: Option<String>,
    pub uurtarief: Decimal,
    pub is_actief: bool,
}

impl From<Project> for ProjectDto {
    fn from(project: Project) -> Self {
        ProjectDto {
            id: project.id,
            naam: project.name,
            klantnaam: project.client_name,
            uurtarief: project.hourly_rate,
            is_actief: project.is_active,
        }
    }
}

/// Body of create and update. Owner and active flag are not accepted from clients.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub klantnaam: Option<String>,
    #[serde(default)]
    pub uurtarief: Decimal,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(req: ProjectRequest) -> Self {
        ProjectInput {
            name: req.naam,
            client_name: req.klantnaam,
            hourly_rate: req.uurtarief,
        }
    }
}
