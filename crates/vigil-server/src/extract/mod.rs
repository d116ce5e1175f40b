//! Custom request extractors.
//!
//! Authentication extractors read the session cookie and verify it
//! without touching the database; body extractors replace the stock
//! axum ones so rejections share the crate's error response shape.

mod auth;
mod pg_connection;
mod reject;

pub use auth::{CurrentUser, SessionClaims, build_session_cookie, build_session_removal_cookie};
pub use pg_connection::PgPool;
pub use reject::{Json, ValidateJson};
