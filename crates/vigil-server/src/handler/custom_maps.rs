//! Custom map handlers, including camera marker placement.
//!
//! A map response always carries its camera placements; saving a map's
//! layout replaces the placement set wholesale.

use axum::extract::Path;
use axum::http::StatusCode;
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;
use vigil_postgres::PgConn;
use vigil_postgres::model::{
    CameraPosition, CustomMap, NewCameraPosition, NewCustomMap, UpdateCustomMap,
};
use vigil_postgres::query::CustomMapRepository;
use vigil_postgres::types::MapKind;

use crate::extract::{CurrentUser, Json, PgPool, ValidateJson};
use crate::handler::{Error, ErrorKind, ErrorResponse, PaginationQuery, Result};
use crate::service::ServiceState;

/// Tracing target for custom map operations.
const TRACING_TARGET: &str = "vigil_server::handler::custom_maps";

fn custom_map_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("Custom map not found")
        .with_resource("custom_map")
}

/// One camera marker as sent and returned by the API.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CameraPositionData {
    /// External camera identifier.
    #[validate(length(min = 1, max = 128))]
    pub camera_id: String,
    /// Camera display name at placement time.
    #[validate(length(min = 1, max = 128))]
    pub camera_name: String,
    /// Horizontal pixel coordinate on the map.
    pub position_x: i32,
    /// Vertical pixel coordinate on the map.
    pub position_y: i32,
    /// Direction the camera faces, in degrees.
    #[validate(range(min = 0, max = 359))]
    pub bearing: Option<i32>,
    /// Field of view, in degrees.
    #[validate(range(min = 1, max = 360))]
    pub field_of_view: Option<i32>,
    /// Viewing distance drawn on the map, in meters.
    #[validate(range(min = 1))]
    pub view_range: Option<i32>,
}

impl From<CameraPosition> for CameraPositionData {
    fn from(position: CameraPosition) -> Self {
        Self {
            camera_id: position.camera_id,
            camera_name: position.camera_name,
            position_x: position.position_x,
            position_y: position.position_y,
            bearing: position.bearing,
            field_of_view: position.field_of_view,
            view_range: position.view_range,
        }
    }
}

impl CameraPositionData {
    fn into_new(self, custom_map_id: Uuid) -> NewCameraPosition {
        NewCameraPosition {
            custom_map_id,
            camera_id: self.camera_id,
            camera_name: self.camera_name,
            position_x: self.position_x,
            position_y: self.position_y,
            bearing: self.bearing,
            field_of_view: self.field_of_view,
            view_range: self.view_range,
        }
    }
}

/// A custom map together with its camera placements.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CustomMapData {
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
    /// Camera placements in placement order.
    pub camera_positions: Vec<CameraPositionData>,
    /// Creation timestamp.
    #[schema(value_type = String)]
    pub created_at: jiff::Timestamp,
    /// Last update timestamp.
    #[schema(value_type = String)]
    pub updated_at: jiff::Timestamp,
}

impl CustomMapData {
    fn new(map: CustomMap, positions: Vec<CameraPosition>) -> Self {
        Self {
            id: map.id,
            name: map.name,
            kind: map.kind,
            image_data: map.image_data,
            image_width: map.image_width,
            image_height: map.image_height,
            tile_url: map.tile_url,
            style_url: map.style_url,
            bounds: map.bounds,
            available: map.available,
            group_id: map.group_id,
            area_name: map.area_name,
            camera_positions: positions.into_iter().map(CameraPositionData::from).collect(),
            created_at: map.created_at.into(),
            updated_at: map.updated_at.into(),
        }
    }
}

async fn load_map_data(conn: &mut PgConn, map: CustomMap) -> Result<CustomMapData> {
    let positions = conn.list_camera_positions(map.id).await?;
    Ok(CustomMapData::new(map, positions))
}

/// Request payload for creating a custom map.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateCustomMapRequest {
    /// Display name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Rendering source of the map.
    pub kind: MapKind,
    /// Base64 image payload for image maps.
    pub image_data: Option<String>,
    /// Pixel width of the image.
    #[validate(range(min = 1))]
    pub image_width: Option<i32>,
    /// Pixel height of the image.
    #[validate(range(min = 1))]
    pub image_height: Option<i32>,
    /// Tile URL template for raster maps.
    #[validate(url)]
    pub tile_url: Option<String>,
    /// Style URL for vector maps.
    #[validate(url)]
    pub style_url: Option<String>,
    /// Geographic bounds for tile-backed maps.
    pub bounds: Option<serde_json::Value>,
    /// Whether the map is offered to operators.
    #[serde(default = "default_available")]
    pub available: bool,
    /// Numeric group owning this map.
    pub group_id: i32,
    /// Human-readable area name.
    #[validate(length(min = 1, max = 128))]
    pub area_name: String,
    /// Initial camera placements.
    #[serde(default)]
    #[validate(nested)]
    pub camera_positions: Vec<CameraPositionData>,
}

fn default_available() -> bool {
    true
}

/// Creates a new custom map with its initial camera placements.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/custom-maps", tag = "custom_maps",
    request_body(
        content = CreateCustomMapRequest,
        description = "Map to create",
        content_type = "application/json",
    ),
    responses(
        (status = CREATED, description = "Map created", body = CustomMapData),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn create_custom_map(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<CreateCustomMapRequest>,
) -> Result<(StatusCode, Json<CustomMapData>)> {
    claims.access_policy().authorize_write(request.group_id)?;

    let new_map = NewCustomMap {
        name: request.name,
        kind: request.kind,
        image_data: request.image_data,
        image_width: request.image_width,
        image_height: request.image_height,
        tile_url: request.tile_url,
        style_url: request.style_url,
        bounds: request.bounds,
        available: request.available,
        group_id: request.group_id,
        area_name: request.area_name,
    };
    let map = conn.create_custom_map(new_map).await?;

    let positions = request
        .camera_positions
        .into_iter()
        .map(|p| p.into_new(map.id))
        .collect();
    let positions = conn.replace_camera_positions(map.id, positions).await?;

    tracing::info!(
        target: TRACING_TARGET,
        map_id = %map.id,
        group_id = map.group_id,
        kind = %map.kind,
        created_by = %claims.username,
        "custom map created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CustomMapData::new(map, positions)),
    ))
}

/// Lists custom maps visible to the caller.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/custom-maps", tag = "custom_maps",
    params(PaginationQuery),
    responses(
        (status = OK, description = "List of maps", body = Vec<CustomMapData>),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn list_custom_maps(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<CustomMapData>>> {
    let maps = match claims.access_policy().visible_scope() {
        None => conn.list_custom_maps(pagination.into()).await?,
        Some(group_id) => {
            conn.list_group_custom_maps(group_id, pagination.into())
                .await?
        }
    };

    let mut data = Vec::with_capacity(maps.len());
    for map in maps {
        data.push(load_map_data(&mut conn, map).await?);
    }

    Ok(Json(data))
}

/// Returns a single custom map with its camera placements.
#[tracing::instrument(skip_all, fields(map_id = %map_id))]
#[utoipa::path(
    get, path = "/custom-maps/{map_id}", tag = "custom_maps",
    params(("map_id" = Uuid, Path, description = "Map to fetch")),
    responses(
        (status = OK, description = "The map", body = CustomMapData),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = NOT_FOUND, description = "Map not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn get_custom_map(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(map_id): Path<Uuid>,
) -> Result<Json<CustomMapData>> {
    let Some(map) = conn.find_custom_map(map_id).await? else {
        return Err(custom_map_not_found());
    };

    claims.access_policy().authorize_read(map.group_id)?;

    let data = load_map_data(&mut conn, map).await?;
    Ok(Json(data))
}

/// Request payload for updating a custom map.
///
/// Map fields are optional and omitted ones stay unchanged; the camera
/// placement set, when present, replaces all existing placements.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateCustomMapRequest {
    /// New display name.
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New rendering source.
    pub kind: Option<MapKind>,
    /// New image payload.
    pub image_data: Option<String>,
    /// New pixel width.
    #[validate(range(min = 1))]
    pub image_width: Option<i32>,
    /// New pixel height.
    #[validate(range(min = 1))]
    pub image_height: Option<i32>,
    /// New tile URL template.
    #[validate(url)]
    pub tile_url: Option<String>,
    /// New style URL.
    #[validate(url)]
    pub style_url: Option<String>,
    /// New geographic bounds.
    pub bounds: Option<serde_json::Value>,
    /// New availability flag.
    pub available: Option<bool>,
    /// Replacement camera placement set.
    #[validate(nested)]
    pub camera_positions: Option<Vec<CameraPositionData>>,
}

/// Applies a partial update to a custom map.
#[tracing::instrument(skip_all, fields(map_id = %map_id))]
#[utoipa::path(
    put, path = "/custom-maps/{map_id}", tag = "custom_maps",
    params(("map_id" = Uuid, Path, description = "Map to update")),
    request_body(
        content = UpdateCustomMapRequest,
        description = "Fields to change",
        content_type = "application/json",
    ),
    responses(
        (status = OK, description = "Map updated", body = CustomMapData),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = NOT_FOUND, description = "Map not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn update_custom_map(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(map_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<UpdateCustomMapRequest>,
) -> Result<Json<CustomMapData>> {
    let Some(existing) = conn.find_custom_map(map_id).await? else {
        return Err(custom_map_not_found());
    };

    let policy = claims.access_policy();
    policy.authorize_read(existing.group_id)?;
    policy.authorize_write(existing.group_id)?;

    let updates = UpdateCustomMap {
        name: request.name,
        kind: request.kind,
        image_data: request.image_data,
        image_width: request.image_width,
        image_height: request.image_height,
        tile_url: request.tile_url,
        style_url: request.style_url,
        bounds: request.bounds,
        available: request.available,
    };
    let map = conn.update_custom_map(map_id, updates).await?;

    let positions = match request.camera_positions {
        Some(positions) => {
            let positions = positions.into_iter().map(|p| p.into_new(map.id)).collect();
            conn.replace_camera_positions(map.id, positions).await?
        }
        None => conn.list_camera_positions(map.id).await?,
    };

    tracing::info!(
        target: TRACING_TARGET,
        map_id = %map.id,
        updated_by = %claims.username,
        "custom map updated"
    );

    Ok(Json(CustomMapData::new(map, positions)))
}

/// Deletes a custom map and its camera placements.
#[tracing::instrument(skip_all, fields(map_id = %map_id))]
#[utoipa::path(
    delete, path = "/custom-maps/{map_id}", tag = "custom_maps",
    params(("map_id" = Uuid, Path, description = "Map to delete")),
    responses(
        (status = NO_CONTENT, description = "Map deleted"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = NOT_FOUND, description = "Map not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn delete_custom_map(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(map_id): Path<Uuid>,
) -> Result<StatusCode> {
    let Some(existing) = conn.find_custom_map(map_id).await? else {
        return Err(custom_map_not_found());
    };

    let policy = claims.access_policy();
    policy.authorize_read(existing.group_id)?;
    policy.authorize_write(existing.group_id)?;

    if conn.delete_custom_map(map_id).await?.is_none() {
        return Err(custom_map_not_found());
    }

    tracing::info!(
        target: TRACING_TARGET,
        map_id = %map_id,
        deleted_by = %claims.username,
        "custom map deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all custom map routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_custom_map, list_custom_maps))
        .routes(routes!(
            get_custom_map,
            update_custom_map,
            delete_custom_map
        ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn create_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/custom-maps")
            .json(&json!({
                "name": "North Yard",
                "kind": "image",
                "groupId": 3,
                "areaName": "North Yard",
            }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn get_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .get(&format!("/custom-maps/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[test]
    fn camera_position_rejects_out_of_range_bearing() {
        let position = CameraPositionData {
            camera_id: "cam-12".to_string(),
            camera_name: "Gate".to_string(),
            position_x: 10,
            position_y: 20,
            bearing: Some(400),
            field_of_view: None,
            view_range: None,
        };

        assert!(position.validate().is_err());
    }
}
