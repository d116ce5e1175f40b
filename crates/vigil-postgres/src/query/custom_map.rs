//! Custom map repository, including camera marker placement.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use super::Pagination;
use crate::model::{CameraPosition, CustomMap, NewCameraPosition, NewCustomMap, UpdateCustomMap};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for custom maps and their camera placements.
pub trait CustomMapRepository {
    /// Creates a new custom map.
    fn create_custom_map(
        &mut self,
        new_map: NewCustomMap,
    ) -> impl Future<Output = PgResult<CustomMap>> + Send;

    /// Finds a custom map by its unique identifier.
    fn find_custom_map(
        &mut self,
        map_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<CustomMap>>> + Send;

    /// Applies a partial update to a custom map.
    fn update_custom_map(
        &mut self,
        map_id: Uuid,
        updates: UpdateCustomMap,
    ) -> impl Future<Output = PgResult<CustomMap>> + Send;

    /// Deletes a custom map and, via cascade, its camera placements.
    /// Returns `None` if no row matched.
    fn delete_custom_map(
        &mut self,
        map_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<CustomMap>>> + Send;

    /// Lists all custom maps, most recently created first.
    fn list_custom_maps(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<CustomMap>>> + Send;

    /// Lists custom maps owned by a single group.
    fn list_group_custom_maps(
        &mut self,
        group_id: i32,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<CustomMap>>> + Send;

    /// Lists camera placements on a map in placement order.
    fn list_camera_positions(
        &mut self,
        map_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<CameraPosition>>> + Send;

    /// Replaces all camera placements on a map in one transaction.
    fn replace_camera_positions(
        &mut self,
        map_id: Uuid,
        positions: Vec<NewCameraPosition>,
    ) -> impl Future<Output = PgResult<Vec<CameraPosition>>> + Send;
}

impl CustomMapRepository for PgConnection {
    async fn create_custom_map(&mut self, mut new_map: NewCustomMap) -> PgResult<CustomMap> {
        use schema::custom_maps;

        new_map.name = new_map.name.trim().to_owned();

        diesel::insert_into(custom_maps::table)
            .values(&new_map)
            .returning(CustomMap::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_custom_map(&mut self, map_id: Uuid) -> PgResult<Option<CustomMap>> {
        use schema::custom_maps::{self, dsl};

        custom_maps::table
            .filter(dsl::id.eq(map_id))
            .select(CustomMap::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_custom_map(
        &mut self,
        map_id: Uuid,
        mut updates: UpdateCustomMap,
    ) -> PgResult<CustomMap> {
        use schema::custom_maps::{self, dsl};

        if let Some(name) = updates.name.as_mut() {
            *name = name.trim().to_owned();
        }

        diesel::update(custom_maps::table.filter(dsl::id.eq(map_id)))
            .set(&updates)
            .returning(CustomMap::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_custom_map(&mut self, map_id: Uuid) -> PgResult<Option<CustomMap>> {
        use schema::custom_maps::{self, dsl};

        diesel::delete(custom_maps::table.filter(dsl::id.eq(map_id)))
            .returning(CustomMap::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_custom_maps(&mut self, pagination: Pagination) -> PgResult<Vec<CustomMap>> {
        use schema::custom_maps::{self, dsl};

        custom_maps::table
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(CustomMap::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_group_custom_maps(
        &mut self,
        group_id: i32,
        pagination: Pagination,
    ) -> PgResult<Vec<CustomMap>> {
        use schema::custom_maps::{self, dsl};

        custom_maps::table
            .filter(dsl::group_id.eq(group_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(CustomMap::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_camera_positions(&mut self, map_id: Uuid) -> PgResult<Vec<CameraPosition>> {
        use schema::camera_positions::{self, dsl};

        camera_positions::table
            .filter(dsl::custom_map_id.eq(map_id))
            .order(dsl::created_at.asc())
            .select(CameraPosition::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn replace_camera_positions(
        &mut self,
        map_id: Uuid,
        positions: Vec<NewCameraPosition>,
    ) -> PgResult<Vec<CameraPosition>> {
        use schema::camera_positions::{self, dsl};

        self.transaction::<_, PgError, _>(|conn| {
            async move {
                diesel::delete(camera_positions::table.filter(dsl::custom_map_id.eq(map_id)))
                    .execute(conn)
                    .await?;

                diesel::insert_into(camera_positions::table)
                    .values(&positions)
                    .returning(CameraPosition::as_returning())
                    .get_results(conn)
                    .await
                    .map_err(PgError::from)
            }
            .scope_boxed()
        })
        .await
    }
}
