pub mod auth;
pub mod json;
pub mod path;
pub mod response;

pub use auth::{require_bearer, CurrentUser};
pub use json::ApiJson;
pub use path::ApiPath;
pub use response::{ApiResponse, ApiResult};
