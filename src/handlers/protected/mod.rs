// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here is mounted behind `require_bearer`; handlers take the
// caller's owner id through the `CurrentUser` extractor and never from the body.

pub mod projects; // /api/projecten
pub mod time_entries; // /api/tijd
pub mod trips; // /api/ritten
