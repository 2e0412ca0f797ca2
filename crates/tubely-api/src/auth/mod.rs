//! Bearer-token authentication.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{bearer_token, issue_access_token, validate_access_token};
pub use models::AuthUser;
