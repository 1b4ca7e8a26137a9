//! Token issuance/validation, identity resolution and password handling.

pub mod identity;
pub mod password;
pub mod token;

pub use identity::{current_user_id, Principal};
pub use token::{Claims, IssuedToken, TokenError, TokenService};
