//! Typed rows for every table: query, insert, and change-set structs.

mod camera_position;
mod custom_map;
mod login_token;
mod user;
mod user_preference;
mod view_group;
mod view_group_audit;

pub use camera_position::{CameraPosition, NewCameraPosition};
pub use custom_map::{CustomMap, NewCustomMap, UpdateCustomMap};
pub use login_token::{LoginToken, NewLoginToken};
pub use user::{NewUser, UpdateUser, User};
pub use user_preference::{NewUserPreference, UpdateUserPreference, UserPreference};
pub use view_group::{NewViewGroup, UpdateViewGroup, ViewGroup};
pub use view_group_audit::{NewViewGroupAudit, ViewGroupAudit};
