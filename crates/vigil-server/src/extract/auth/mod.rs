//! Session authentication extractors.

mod current_user;
mod session_claims;
mod session_cookie;

pub use current_user::CurrentUser;
pub use session_claims::SessionClaims;
pub use session_cookie::{build_session_cookie, build_session_removal_cookie};

/// Target identifier for authentication logging.
pub(crate) const TRACING_TARGET_AUTHENTICATION: &str = "vigil_server::extract::authentication";
