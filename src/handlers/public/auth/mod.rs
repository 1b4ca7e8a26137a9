// handlers/public/auth/mod.rs - Account registration and login

pub mod login; // POST /api/auth/login - verify credentials, issue bearer token
pub mod register; // POST /api/auth/register - create an account

pub use login::login_post;
pub use register::register_post;
