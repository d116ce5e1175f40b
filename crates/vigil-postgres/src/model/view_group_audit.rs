//! Append-only audit trail for view group mutations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::view_group_audits;
use crate::types::AuditAction;

/// One recorded mutation of a view group.
///
/// Rows are never updated or deleted. The audited view group id is a
/// plain string and not a foreign key, so the trail survives the view
/// group's deletion.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = view_group_audits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ViewGroupAudit {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// Identifier of the audited view group.
    pub view_group_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Username of the actor.
    pub changed_by: String,
    /// Snapshot of the submitted changes.
    pub changes: serde_json::Value,
    /// Timestamp when the entry was recorded.
    pub created_at: Timestamp,
}

/// Data for appending an audit entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = view_group_audits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewViewGroupAudit {
    /// Identifier of the audited view group.
    pub view_group_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Username of the actor.
    pub changed_by: String,
    /// Snapshot of the submitted changes.
    pub changes: serde_json::Value,
}
