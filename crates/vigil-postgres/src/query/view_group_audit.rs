//! Append-only repository for the view group audit trail.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::Pagination;
use crate::model::{NewViewGroupAudit, ViewGroupAudit};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for view group audit entries.
///
/// Intentionally exposes no update or delete operations; the trail is
/// append-only by construction.
pub trait ViewGroupAuditRepository {
    /// Appends an audit entry.
    fn create_view_group_audit(
        &mut self,
        new_audit: NewViewGroupAudit,
    ) -> impl Future<Output = PgResult<ViewGroupAudit>> + Send;

    /// Lists audit entries for one view group, most recent first.
    fn list_view_group_audits(
        &mut self,
        view_group_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = PgResult<Vec<ViewGroupAudit>>> + Send;
}

impl ViewGroupAuditRepository for PgConnection {
    async fn create_view_group_audit(
        &mut self,
        new_audit: NewViewGroupAudit,
    ) -> PgResult<ViewGroupAudit> {
        use schema::view_group_audits;

        diesel::insert_into(view_group_audits::table)
            .values(&new_audit)
            .returning(ViewGroupAudit::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_view_group_audits(
        &mut self,
        view_group_id: &str,
        pagination: Pagination,
    ) -> PgResult<Vec<ViewGroupAudit>> {
        use schema::view_group_audits::{self, dsl};

        view_group_audits::table
            .filter(dsl::view_group_id.eq(view_group_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(ViewGroupAudit::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }
}
