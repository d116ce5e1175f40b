//! View group model.
//!
//! A view group is a named arrangement of camera feeds shown on a wall
//! monitor. Identifiers are caller-supplied strings rather than UUIDs
//! because the frontend mints them.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::view_groups;

/// A named arrangement of camera feeds.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = view_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ViewGroup {
    /// Caller-supplied identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Numeric group owning this view.
    pub group_id: i32,
    /// Human-readable area name.
    pub area_name: String,
    /// Whether this view belongs to the headquarters wall.
    pub is_hq: bool,
    /// Ordered camera layout as stored by the frontend.
    pub cameras: serde_json::Value,
    /// Seconds between automatic layout rotations, if enabled.
    pub auto_rotation_interval: Option<i32>,
    /// Username of the creator.
    pub created_by: String,
    /// Username of the last editor.
    pub updated_by: Option<String>,
    /// Timestamp when the view group was created.
    pub created_at: Timestamp,
    /// Timestamp when the view group was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new view group.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = view_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewViewGroup {
    /// Caller-supplied identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Numeric group owning this view.
    pub group_id: i32,
    /// Human-readable area name.
    pub area_name: String,
    /// Whether this view belongs to the headquarters wall.
    pub is_hq: bool,
    /// Ordered camera layout.
    pub cameras: serde_json::Value,
    /// Seconds between automatic layout rotations, if enabled.
    pub auto_rotation_interval: Option<i32>,
    /// Username of the creator.
    pub created_by: String,
}

/// Data for updating an existing view group.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = view_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateViewGroup {
    /// New display name.
    pub name: Option<String>,
    /// New headquarters flag.
    pub is_hq: Option<bool>,
    /// New camera layout.
    pub cameras: Option<serde_json::Value>,
    /// New rotation interval.
    pub auto_rotation_interval: Option<i32>,
    /// Username of the editor making this change.
    pub updated_by: Option<String>,
}
