//! Database query repositories for all entities in the system.
//!
//! Repositories are traits implemented directly on [`PgConnection`],
//! so handlers borrow a pooled connection and call domain operations
//! without touching diesel query syntax.
//!
//! [`PgConnection`]: crate::PgConnection

pub mod custom_map;
pub mod login_token;
pub mod user;
pub mod user_preference;
pub mod view_group;
pub mod view_group_audit;

pub use custom_map::CustomMapRepository;
pub use login_token::LoginTokenRepository;
pub use user::UserRepository;
pub use user_preference::UserPreferenceRepository;
pub use view_group::ViewGroupRepository;
pub use view_group_audit::ViewGroupAuditRepository;

pub use crate::types::Pagination;
