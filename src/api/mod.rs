//! Wire shapes and the entity <-> transfer mapping.
//!
//! Field names follow the public JSON contract (camelCase Dutch); the
//! persistence models in `crate::database::models` stay independent of it.

pub mod auth;
pub mod project;
pub mod time_entry;
pub mod trip;

pub use auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
pub use project::{ProjectDto, ProjectRequest};
pub use time_entry::{StartTimeEntryRequest, TimeEntryDto};
pub use trip::{TripDto, TripRequest};
