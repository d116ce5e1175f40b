//! View group repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::Pagination;
use crate::model::{NewViewGroup, UpdateViewGroup, ViewGroup};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for view group database operations.
pub trait ViewGroupRepository {
    /// Creates a new view group with a caller-supplied identifier.
    fn create_view_group(
        &mut self,
        new_view_group: NewViewGroup,
    ) -> impl Future<Output = PgResult<ViewGroup>> + Send;

    /// Finds a view group by its identifier.
    fn find_view_group(
        &mut self,
        view_group_id: &str,
    ) -> impl Future<Output = PgResult<Option<ViewGroup>>> + Send;

    /// Applies a partial update to a view group.
    fn update_view_group(
        &mut self,
        view_group_id: &str,
        updates: UpdateViewGroup,
    ) -> impl Future<Output = PgResult<ViewGroup>> + Send;

    /// Deletes a view group. Returns `None` if no row matched.
    fn delete_view_group(
        &mut self,
        view_group_id: &str,
    ) -> impl Future<Output = PgResult<Option<ViewGroup>>> + Send;

    /// Lists all view groups, most recently created first.
    fn list_view_groups(
        &mut self,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<ViewGroup>>> + Send;

    /// Lists view groups owned by a single group.
    fn list_group_view_groups(
        &mut self,
        group_id: i32,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<ViewGroup>>> + Send;
}

impl ViewGroupRepository for PgConnection {
    async fn create_view_group(&mut self, mut new_view_group: NewViewGroup) -> PgResult<ViewGroup> {
        use schema::view_groups;

        new_view_group.name = new_view_group.name.trim().to_owned();

        diesel::insert_into(view_groups::table)
            .values(&new_view_group)
            .returning(ViewGroup::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_view_group(&mut self, view_group_id: &str) -> PgResult<Option<ViewGroup>> {
        use schema::view_groups::{self, dsl};

        view_groups::table
            .filter(dsl::id.eq(view_group_id))
            .select(ViewGroup::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_view_group(
        &mut self,
        view_group_id: &str,
        mut updates: UpdateViewGroup,
    ) -> PgResult<ViewGroup> {
        use schema::view_groups::{self, dsl};

        if let Some(name) = updates.name.as_mut() {
            *name = name.trim().to_owned();
        }

        diesel::update(view_groups::table.filter(dsl::id.eq(view_group_id)))
            .set(&updates)
            .returning(ViewGroup::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_view_group(&mut self, view_group_id: &str) -> PgResult<Option<ViewGroup>> {
        use schema::view_groups::{self, dsl};

        diesel::delete(view_groups::table.filter(dsl::id.eq(view_group_id)))
            .returning(ViewGroup::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_view_groups(&mut self, pagination: Pagination) -> PgResult<Vec<ViewGroup>> {
        use schema::view_groups::{self, dsl};

        view_groups::table
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(ViewGroup::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_group_view_groups(
        &mut self,
        group_id: i32,
        pagination: Pagination,
    ) -> PgResult<Vec<ViewGroup>> {
        use schema::view_groups::{self, dsl};

        view_groups::table
            .filter(dsl::group_id.eq(group_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(ViewGroup::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
