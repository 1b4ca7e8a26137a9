//! Ownership-scoped business rules.
//!
//! Services take the already-resolved owner id, apply the existence,
//! ownership and validation checks (in that order), then call the store.

use std::collections::HashMap;

use thiserror::Error;

use crate::database::{DatabaseError, ProjectRepository, Store};

pub mod account_service;
pub mod project_service;
pub mod time_entry_service;
pub mod trip_service;

pub use account_service::{AccountService, LoginOutput, RegisterInput};
pub use project_service::{ProjectInput, ProjectService};
pub use time_entry_service::{StartTimeEntry, TimeEntryService};
pub use trip_service::{TripInput, TripService};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ServiceError::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) const ACCOUNT_GONE: &str = "Account no longer exists";

/// Name the reference behind a foreign-key failure on insert.
///
/// Rows point at both a project and the owning user. If the project is still
/// there, the owner is what went missing: the token outlived its account.
pub(crate) async fn missing_reference(store: &dyn Store, project_id: Option<i32>) -> ServiceError {
    if let Some(id) = project_id {
        match store.find_project(id).await {
            Ok(None) => return ServiceError::NotFound(format!("Project {} not found", id)),
            Ok(Some(_)) => {}
            Err(err) => return err.into(),
        }
    }
    ServiceError::Unauthenticated(ACCOUNT_GONE.to_string())
}

/// Trim and reject blank or over-long required text.
pub(crate) fn required_text(field: &str, value: &str, max_chars: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::field(field, format!("{field} is required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::field(
            field,
            format!("{field} may not exceed {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text; blank becomes `None`.
pub(crate) fn optional_text(field: &str, value: Option<&str>, max_chars: usize) -> ServiceResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > max_chars => Err(ServiceError::field(
            field,
            format!("{field} may not exceed {max_chars} characters"),
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}
