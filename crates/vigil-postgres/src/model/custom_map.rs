//! Custom map model.
//!
//! Maps come in three kinds: static uploaded images, raster tile
//! servers, and vector styles. Which of the optional columns are set
//! depends on the kind.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::custom_maps;
use crate::types::MapKind;

/// A map used to place camera markers on.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = custom_maps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomMap {
    /// Unique map identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Rendering source of the map.
    pub kind: MapKind,
    /// Base64 image payload for image maps.
    pub image_data: Option<String>,
    /// Pixel width of the image.
    pub image_width: Option<i32>,
    /// Pixel height of the image.
    pub image_height: Option<i32>,
    /// Tile URL template for raster maps.
    pub tile_url: Option<String>,
    /// Style URL for vector maps.
    pub style_url: Option<String>,
    /// Geographic bounds for tile-backed maps.
    pub bounds: Option<serde_json::Value>,
    /// Whether the map is offered to operators.
    pub available: bool,
    /// Numeric group owning this map.
    pub group_id: i32,
    /// Human-readable area name.
    pub area_name: String,
    /// Timestamp when the map was created.
    pub created_at: Timestamp,
    /// Timestamp when the map was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new custom map.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = custom_maps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCustomMap {
    /// Display name.
    pub name: String,
    /// Rendering source of the map.
    pub kind: MapKind,
    /// Base64 image payload for image maps.
    pub image_data: Option<String>,
    /// Pixel width of the image.
    pub image_width: Option<i32>,
    /// Pixel height of the image.
    pub image_height: Option<i32>,
    /// Tile URL template for raster maps.
    pub tile_url: Option<String>,
    /// Style URL for vector maps.
    pub style_url: Option<String>,
    /// Geographic bounds for tile-backed maps.
    pub bounds: Option<serde_json::Value>,
    /// Whether the map is offered to operators.
    pub available: bool,
    /// Numeric group owning this map.
    pub group_id: i32,
    /// Human-readable area name.
    pub area_name: String,
}

/// Data for updating an existing custom map.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = custom_maps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateCustomMap {
    /// New display name.
    pub name: Option<String>,
    /// New rendering source.
    pub kind: Option<MapKind>,
    /// New image payload.
    pub image_data: Option<String>,
    /// New pixel width.
    pub image_width: Option<i32>,
    /// New pixel height.
    pub image_height: Option<i32>,
    /// New tile URL template.
    pub tile_url: Option<String>,
    /// New style URL.
    pub style_url: Option<String>,
    /// New geographic bounds.
    pub bounds: Option<serde_json::Value>,
    /// New availability flag.
    pub available: Option<bool>,
}
