//! Camera marker placements on a custom map.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::camera_positions;

/// One camera marker placed on a map.
///
/// Positions are replaced wholesale when a map's layout is saved, so
/// there is no update struct.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = camera_positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CameraPosition {
    /// Unique marker identifier.
    pub id: Uuid,
    /// Map the marker is placed on.
    pub custom_map_id: Uuid,
    /// External camera identifier.
    pub camera_id: String,
    /// Camera display name at placement time.
    pub camera_name: String,
    /// Horizontal pixel coordinate on the map.
    pub position_x: i32,
    /// Vertical pixel coordinate on the map.
    pub position_y: i32,
    /// Direction the camera faces, in degrees.
    pub bearing: Option<i32>,
    /// Field of view, in degrees.
    pub field_of_view: Option<i32>,
    /// Viewing distance drawn on the map, in meters.
    pub view_range: Option<i32>,
    /// Timestamp when the marker was placed.
    pub created_at: Timestamp,
}

/// Data for placing a camera marker.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = camera_positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCameraPosition {
    /// Map the marker is placed on.
    pub custom_map_id: Uuid,
    /// External camera identifier.
    pub camera_id: String,
    /// Camera display name at placement time.
    pub camera_name: String,
    /// Horizontal pixel coordinate on the map.
    pub position_x: i32,
    /// Vertical pixel coordinate on the map.
    pub position_y: i32,
    /// Direction the camera faces, in degrees.
    pub bearing: Option<i32>,
    /// Field of view, in degrees.
    pub field_of_view: Option<i32>,
    /// Viewing distance drawn on the map, in meters.
    pub view_range: Option<i32>,
}
