pub mod auth;
pub mod response;

pub use auth::{identify, require_admin, require_logged_in, require_self_or_admin, Identity, RequestContext};
pub use response::{log_errors, not_found, ApiResponse, ApiResult};
