//! View group handlers.
//!
//! A view group is a named arrangement of camera feeds on a wall
//! monitor. Every mutation appends an entry to the audit trail; the
//! trail is best-effort and never blocks the mutation itself.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;
use vigil_postgres::model::{NewViewGroup, NewViewGroupAudit, UpdateViewGroup, ViewGroup,
    ViewGroupAudit};
use vigil_postgres::query::{ViewGroupAuditRepository, ViewGroupRepository};
use vigil_postgres::types::AuditAction;
use vigil_postgres::PgConn;

use crate::extract::{CurrentUser, Json, PgPool, ValidateJson};
use crate::handler::{Error, ErrorKind, ErrorResponse, PaginationQuery, Result};
use crate::service::ServiceState;

/// Tracing target for view group operations.
const TRACING_TARGET: &str = "vigil_server::handler::view_groups";

fn view_group_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("View group not found")
        .with_resource("view_group")
}

/// Serializes a request payload into the audit change description.
///
/// The description is mandatory, so a payload that cannot be serialized
/// aborts the mutation before anything is written.
fn change_description<T: Serialize>(request: &T) -> Result<serde_json::Value> {
    serde_json::to_value(request).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET,
            error = %e,
            "failed to serialize the audit change description"
        );
        ErrorKind::InternalServerError.into_error()
    })
}

/// Appends an audit entry for a view group mutation.
///
/// Failures are logged and swallowed: the mutation already happened, so
/// a broken trail must not turn it into a client-facing error.
async fn record_audit(
    conn: &mut PgConn,
    view_group_id: &str,
    action: AuditAction,
    changed_by: &str,
    changes: serde_json::Value,
) {
    let new_audit = NewViewGroupAudit {
        view_group_id: view_group_id.to_owned(),
        action,
        changed_by: changed_by.to_owned(),
        changes,
    };

    if let Err(e) = conn.create_view_group_audit(new_audit).await {
        tracing::error!(
            target: TRACING_TARGET,
            view_group_id,
            action = %action,
            error = %e,
            "failed to append a view group audit entry"
        );
    }
}

/// A view group as returned to clients.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ViewGroupData {
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
    /// Creation timestamp.
    #[schema(value_type = String)]
    pub created_at: jiff::Timestamp,
    /// Last update timestamp.
    #[schema(value_type = String)]
    pub updated_at: jiff::Timestamp,
}

impl From<ViewGroup> for ViewGroupData {
    fn from(view_group: ViewGroup) -> Self {
        Self {
            id: view_group.id,
            name: view_group.name,
            group_id: view_group.group_id,
            area_name: view_group.area_name,
            is_hq: view_group.is_hq,
            cameras: view_group.cameras,
            auto_rotation_interval: view_group.auto_rotation_interval,
            created_by: view_group.created_by,
            updated_by: view_group.updated_by,
            created_at: view_group.created_at.into(),
            updated_at: view_group.updated_at.into(),
        }
    }
}

/// Request payload for creating a view group.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateViewGroupRequest {
    /// Caller-supplied identifier, minted by the frontend.
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    /// Display name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Numeric group owning this view.
    pub group_id: i32,
    /// Human-readable area name.
    #[validate(length(min = 1, max = 128))]
    pub area_name: String,
    /// Whether this view belongs to the headquarters wall.
    #[serde(default)]
    pub is_hq: bool,
    /// Ordered camera layout.
    pub cameras: serde_json::Value,
    /// Seconds between automatic layout rotations.
    #[validate(range(min = 1))]
    pub auto_rotation_interval: Option<i32>,
}

/// Creates a new view group.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/view-groups", tag = "view_groups",
    request_body(
        content = CreateViewGroupRequest,
        description = "View group to create",
        content_type = "application/json",
    ),
    responses(
        (status = CREATED, description = "View group created", body = ViewGroupData),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = CONFLICT, description = "Identifier already taken", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn create_view_group(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<CreateViewGroupRequest>,
) -> Result<(StatusCode, Json<ViewGroupData>)> {
    claims.access_policy().authorize_write(request.group_id)?;

    let changes = change_description(&request)?;

    let new_view_group = NewViewGroup {
        id: request.id,
        name: request.name,
        group_id: request.group_id,
        area_name: request.area_name,
        is_hq: request.is_hq,
        cameras: request.cameras,
        auto_rotation_interval: request.auto_rotation_interval,
        created_by: claims.username.clone(),
    };
    let view_group = conn.create_view_group(new_view_group).await.map_err(|e| {
        if e.is_unique_violation() {
            return ErrorKind::Conflict
                .with_message("A view group with this identifier already exists")
                .with_resource("view_group");
        }
        e.into()
    })?;

    record_audit(
        &mut conn,
        &view_group.id,
        AuditAction::Create,
        &claims.username,
        changes,
    )
    .await;

    tracing::info!(
        target: TRACING_TARGET,
        view_group_id = %view_group.id,
        group_id = view_group.group_id,
        created_by = %claims.username,
        "view group created"
    );

    Ok((StatusCode::CREATED, Json(view_group.into())))
}

/// Lists view groups visible to the caller.
///
/// Admins see every group; everyone else sees only their own group's
/// views.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/view-groups", tag = "view_groups",
    params(PaginationQuery),
    responses(
        (status = OK, description = "List of view groups", body = Vec<ViewGroupData>),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn list_view_groups(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<ViewGroupData>>> {
    let view_groups = match claims.access_policy().visible_scope() {
        None => conn.list_view_groups(pagination.into()).await?,
        Some(group_id) => {
            conn.list_group_view_groups(group_id, pagination.into())
                .await?
        }
    };

    let data = view_groups.into_iter().map(ViewGroupData::from).collect();
    Ok(Json(data))
}

/// Returns a single view group.
#[tracing::instrument(skip_all, fields(view_group_id = %view_group_id))]
#[utoipa::path(
    get, path = "/view-groups/{view_group_id}", tag = "view_groups",
    params(("view_group_id" = String, Path, description = "View group to fetch")),
    responses(
        (status = OK, description = "The view group", body = ViewGroupData),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = NOT_FOUND, description = "View group not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn get_view_group(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(view_group_id): Path<String>,
) -> Result<Json<ViewGroupData>> {
    let Some(view_group) = conn.find_view_group(&view_group_id).await? else {
        return Err(view_group_not_found());
    };

    claims.access_policy().authorize_read(view_group.group_id)?;

    Ok(Json(view_group.into()))
}

/// Request payload for updating a view group.
///
/// All fields are optional; omitted fields stay unchanged. Ownership
/// fields (`groupId`, `areaName`) cannot be changed after creation.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateViewGroupRequest {
    /// New display name.
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New headquarters flag.
    pub is_hq: Option<bool>,
    /// New camera layout.
    pub cameras: Option<serde_json::Value>,
    /// New rotation interval.
    #[validate(range(min = 1))]
    pub auto_rotation_interval: Option<i32>,
}

/// Applies a partial update to a view group.
#[tracing::instrument(skip_all, fields(view_group_id = %view_group_id))]
#[utoipa::path(
    put, path = "/view-groups/{view_group_id}", tag = "view_groups",
    params(("view_group_id" = String, Path, description = "View group to update")),
    request_body(
        content = UpdateViewGroupRequest,
        description = "Fields to change",
        content_type = "application/json",
    ),
    responses(
        (status = OK, description = "View group updated", body = ViewGroupData),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = NOT_FOUND, description = "View group not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn update_view_group(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(view_group_id): Path<String>,
    ValidateJson(request): ValidateJson<UpdateViewGroupRequest>,
) -> Result<Json<ViewGroupData>> {
    let Some(existing) = conn.find_view_group(&view_group_id).await? else {
        return Err(view_group_not_found());
    };

    // Read check first, so cross-group callers cannot tell a forbidden
    // view group from a missing one.
    let policy = claims.access_policy();
    policy.authorize_read(existing.group_id)?;
    policy.authorize_write(existing.group_id)?;

    let changes = change_description(&request)?;

    let updates = UpdateViewGroup {
        name: request.name,
        is_hq: request.is_hq,
        cameras: request.cameras,
        auto_rotation_interval: request.auto_rotation_interval,
        updated_by: Some(claims.username.clone()),
    };
    let view_group = conn.update_view_group(&view_group_id, updates).await?;

    record_audit(
        &mut conn,
        &view_group.id,
        AuditAction::Update,
        &claims.username,
        changes,
    )
    .await;

    tracing::info!(
        target: TRACING_TARGET,
        view_group_id = %view_group.id,
        updated_by = %claims.username,
        "view group updated"
    );

    Ok(Json(view_group.into()))
}

/// Deletes a view group.
///
/// The audit trail survives the deletion; it references the view group
/// by its plain identifier rather than a foreign key.
#[tracing::instrument(skip_all, fields(view_group_id = %view_group_id))]
#[utoipa::path(
    delete, path = "/view-groups/{view_group_id}", tag = "view_groups",
    params(("view_group_id" = String, Path, description = "View group to delete")),
    responses(
        (status = NO_CONTENT, description = "View group deleted"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = NOT_FOUND, description = "View group not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn delete_view_group(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(view_group_id): Path<String>,
) -> Result<StatusCode> {
    let Some(existing) = conn.find_view_group(&view_group_id).await? else {
        return Err(view_group_not_found());
    };

    let policy = claims.access_policy();
    policy.authorize_read(existing.group_id)?;
    policy.authorize_write(existing.group_id)?;

    if conn.delete_view_group(&view_group_id).await?.is_none() {
        return Err(view_group_not_found());
    }

    record_audit(
        &mut conn,
        &view_group_id,
        AuditAction::Delete,
        &claims.username,
        serde_json::json!({ "name": existing.name }),
    )
    .await;

    tracing::info!(
        target: TRACING_TARGET,
        view_group_id = %view_group_id,
        deleted_by = %claims.username,
        "view group deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// One audit trail entry as returned to clients.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct AuditEntryData {
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
    #[schema(value_type = String)]
    pub created_at: jiff::Timestamp,
}

impl From<ViewGroupAudit> for AuditEntryData {
    fn from(audit: ViewGroupAudit) -> Self {
        Self {
            id: audit.id,
            view_group_id: audit.view_group_id,
            action: audit.action,
            changed_by: audit.changed_by,
            changes: audit.changes,
            created_at: audit.created_at.into(),
        }
    }
}

/// Lists the audit trail of one view group, most recent first.
///
/// Admin-only; the trail exposes who changed what across groups.
#[tracing::instrument(skip_all, fields(view_group_id = %view_group_id))]
#[utoipa::path(
    get, path = "/view-groups/{view_group_id}/audit", tag = "view_groups",
    params(
        ("view_group_id" = String, Path, description = "View group whose trail to list"),
        PaginationQuery,
    ),
    responses(
        (status = OK, description = "Audit entries", body = Vec<AuditEntryData>),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn list_view_group_audits(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(view_group_id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<AuditEntryData>>> {
    claims.access_policy().require_admin()?;

    let audits = conn
        .list_view_group_audits(&view_group_id, pagination.into())
        .await?;

    let data = audits.into_iter().map(AuditEntryData::from).collect();
    Ok(Json(data))
}

/// Returns a [`Router`] with all view group routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_view_group, list_view_groups))
        .routes(routes!(
            get_view_group,
            update_view_group,
            delete_view_group
        ))
        .routes(routes!(list_view_group_audits))
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::Cookie;
    use serde_json::json;
    use vigil_postgres::model::{NewUser, User};
    use vigil_postgres::query::{Pagination, UserRepository};
    use vigil_postgres::types::UserRole;

    use super::*;
    use crate::extract::{SessionClaims, build_session_cookie};
    use crate::handler::test::{create_test_server_with_router, create_test_server_with_state};
    use crate::service::{ServiceConfig, TokenKind};

    async fn seed_user(conn: &mut PgConn, role: UserRole, group_id: i32) -> anyhow::Result<User> {
        let user = conn
            .create_user(NewUser {
                username: format!("operator-{}", Uuid::new_v4()),
                password_hash: "unused-in-cookie-tests".into(),
                group_id,
                area_name: "North".into(),
                role,
            })
            .await?;
        Ok(user)
    }

    async fn seed_view_group(conn: &mut PgConn, group_id: i32) -> anyhow::Result<ViewGroup> {
        let view_group = conn
            .create_view_group(NewViewGroup {
                id: format!("wall-{}", Uuid::new_v4()),
                name: "Test Wall".into(),
                group_id,
                area_name: "North".into(),
                is_hq: false,
                cameras: json!([]),
                auto_rotation_interval: None,
                created_by: "seed".into(),
            })
            .await?;
        Ok(view_group)
    }

    fn session_cookie(user: &User, state: &ServiceState) -> anyhow::Result<Cookie<'static>> {
        let lifetime = state.session_settings.session_lifetime_secs;
        let claims = SessionClaims::for_user(user, lifetime);
        let token = claims.encode(&state.token_keys, TokenKind::Session)?;
        Ok(build_session_cookie(token, lifetime))
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn create_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/view-groups")
            .json(&json!({
                "id": "hq-wall",
                "name": "HQ Wall",
                "groupId": 1,
                "areaName": "Headquarters",
                "cameras": [],
            }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn get_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server.get("/view-groups/hq-wall").await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn area_admin_cross_group_read_reports_not_found() -> anyhow::Result<()> {
        let state = ServiceState::from_config(&ServiceConfig::default()).await?;
        let mut conn = state.postgres.get_connection().await?;

        let actor = seed_user(&mut conn, UserRole::AreaAdmin, 10).await?;
        let foreign = seed_view_group(&mut conn, 11).await?;

        let cookie = session_cookie(&actor, &state)?;
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .get(&format!("/view-groups/{}", foreign.id))
            .add_cookie(cookie)
            .await;

        response.assert_status_not_found();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn basic_user_delete_is_forbidden_without_audit() -> anyhow::Result<()> {
        let state = ServiceState::from_config(&ServiceConfig::default()).await?;
        let mut conn = state.postgres.get_connection().await?;

        let actor = seed_user(&mut conn, UserRole::BasicUser, 20).await?;
        let view_group = seed_view_group(&mut conn, 20).await?;

        let cookie = session_cookie(&actor, &state)?;
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .delete(&format!("/view-groups/{}", view_group.id))
            .add_cookie(cookie)
            .await;
        response.assert_status_forbidden();

        // The rejected mutation leaves no trace: the view group survives
        // and the trail stays empty.
        assert!(conn.find_view_group(&view_group.id).await?.is_some());
        let audits = conn
            .list_view_group_audits(&view_group.id, Pagination::default())
            .await?;
        assert!(audits.is_empty());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn audit_append_failures_are_swallowed() -> anyhow::Result<()> {
        let state = ServiceState::from_config(&ServiceConfig::default()).await?;
        let mut conn = state.postgres.get_connection().await?;

        // Postgres jsonb rejects NUL characters, so this append fails
        // inside `record_audit` and must not propagate.
        let view_group_id = format!("wall-{}", Uuid::new_v4());
        record_audit(
            &mut conn,
            &view_group_id,
            AuditAction::Update,
            "auditor",
            serde_json::Value::String("\u{0}".into()),
        )
        .await;

        let audits = conn
            .list_view_group_audits(&view_group_id, Pagination::default())
            .await?;
        assert!(audits.is_empty());
        Ok(())
    }

    #[test]
    fn change_description_aborts_on_unserializable_payloads() {
        let error = change_description(&f64::NAN).expect_err("NaN has no JSON form");
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn update_request_serializes_to_camel_case() {
        let request = UpdateViewGroupRequest {
            name: Some("North Wall".to_string()),
            auto_rotation_interval: Some(30),
            ..Default::default()
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["name"], "North Wall");
        assert_eq!(value["autoRotationInterval"], 30);
    }
}
