//! Persistence-shaped entities. Wire shapes live in `crate::api`.

pub mod project;
pub mod time_entry;
pub mod trip_entry;
pub mod user;

pub use project::{NewProject, Project, ProjectChanges};
pub use time_entry::{NewTimeEntry, TimeEntry, TimeEntryView};
pub use trip_entry::{NewTripEntry, TripEntry, TripFields};
pub use user::{NewUser, User};
