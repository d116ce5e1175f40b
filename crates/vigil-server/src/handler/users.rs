//! User account management handlers.
//!
//! All operations here are administrator-only. Non-admin callers get a
//! forbidden response regardless of group membership.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;
use vigil_postgres::model::{NewUser, UpdateUser};
use vigil_postgres::query::UserRepository;
use vigil_postgres::types::UserRole;

use crate::extract::{CurrentUser, Json, PgPool, ValidateJson};
use crate::handler::{ErrorKind, ErrorResponse, PaginationQuery, Result, UserProfile};
use crate::service::{PasswordHasher, ServiceState};

/// Tracing target for user management operations.
const TRACING_TARGET: &str = "vigil_server::handler::users";

/// Request payload for creating a user.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    /// Login name, unique across the system.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Initial password, stored only as a hash.
    #[validate(length(min = 8, max = 256))]
    pub password: String,
    /// Numeric group the user belongs to.
    pub group_id: i32,
    /// Human-readable name of the user's area.
    #[validate(length(min = 1, max = 128))]
    pub area_name: String,
    /// Authorization role.
    pub role: UserRole,
}

/// Creates a new user account.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body(
        content = CreateUserRequest,
        description = "Account to create",
        content_type = "application/json",
    ),
    responses(
        (status = CREATED, description = "User created", body = UserProfile),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = CONFLICT, description = "Username already taken", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn create_user(
    CurrentUser(claims): CurrentUser,
    State(password_hasher): State<PasswordHasher>,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    claims.access_policy().require_admin()?;

    let password_hash = password_hasher.hash_password(&request.password)?;

    let new_user = NewUser {
        username: request.username,
        password_hash,
        group_id: request.group_id,
        area_name: request.area_name,
        role: request.role,
    };
    let user = conn.create_user(new_user).await.map_err(|e| {
        if e.is_unique_violation() {
            return ErrorKind::Conflict
                .with_message("A user with this username already exists")
                .with_resource("user");
        }
        e.into()
    })?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        group_id = user.group_id,
        role = %user.role,
        created_by = %claims.username,
        "user created"
    );

    Ok((StatusCode::CREATED, Json(UserProfile::from(user))))
}

/// Lists user accounts, most recently created first.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/users", tag = "users",
    params(PaginationQuery),
    responses(
        (status = OK, description = "List of users", body = Vec<UserProfile>),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn list_users(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<Vec<UserProfile>>> {
    claims.access_policy().require_admin()?;

    let users = conn.list_users(pagination.into()).await?;
    let profiles = users.iter().map(UserProfile::from).collect();

    Ok(Json(profiles))
}

/// Request payload for updating a user.
///
/// All fields are optional; omitted fields stay unchanged. A new
/// password replaces the stored hash.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    /// New login name.
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    /// New password.
    #[validate(length(min = 8, max = 256))]
    pub password: Option<String>,
    /// New group assignment.
    pub group_id: Option<i32>,
    /// New area name.
    #[validate(length(min = 1, max = 128))]
    pub area_name: Option<String>,
    /// New authorization role.
    pub role: Option<UserRole>,
}

/// Applies a partial update to a user account.
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
#[utoipa::path(
    put, path = "/users/{user_id}", tag = "users",
    params(("user_id" = Uuid, Path, description = "User to update")),
    request_body(
        content = UpdateUserRequest,
        description = "Fields to change",
        content_type = "application/json",
    ),
    responses(
        (status = OK, description = "User updated", body = UserProfile),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = NOT_FOUND, description = "User not found", body = ErrorResponse),
        (status = CONFLICT, description = "Username already taken", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn update_user(
    CurrentUser(claims): CurrentUser,
    State(password_hasher): State<PasswordHasher>,
    PgPool(mut conn): PgPool,
    Path(user_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<UpdateUserRequest>,
) -> Result<Json<UserProfile>> {
    claims.access_policy().require_admin()?;

    if conn.find_user_by_id(user_id).await?.is_none() {
        return Err(ErrorKind::NotFound
            .with_message("User not found")
            .with_resource("user"));
    }

    let password_hash = match request.password {
        Some(ref password) => Some(password_hasher.hash_password(password)?),
        None => None,
    };

    let updates = UpdateUser {
        username: request.username,
        password_hash,
        group_id: request.group_id,
        area_name: request.area_name,
        role: request.role,
    };
    let user = conn.update_user(user_id, updates).await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        updated_by = %claims.username,
        "user updated"
    );

    Ok(Json(UserProfile::from(user)))
}

/// Soft-deletes a user account.
///
/// Existing sessions and login links for the account stop working on
/// their next request, since every authenticated request re-checks the
/// user row.
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
#[utoipa::path(
    delete, path = "/users/{user_id}", tag = "users",
    params(("user_id" = Uuid, Path, description = "User to delete")),
    responses(
        (status = NO_CONTENT, description = "User deleted"),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = FORBIDDEN, description = "Forbidden", body = ErrorResponse),
        (status = NOT_FOUND, description = "User not found", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn delete_user(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode> {
    claims.access_policy().require_admin()?;

    let Some(user) = conn.delete_user(user_id).await? else {
        return Err(ErrorKind::NotFound
            .with_message("User not found")
            .with_resource("user"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        deleted_by = %claims.username,
        "user deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all user management routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_user, list_users))
        .routes(routes!(update_user, delete_user))
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
            .post("/users")
            .json(&json!({
                "username": "operator",
                "password": "correct-horse",
                "groupId": 3,
                "areaName": "North Yard",
                "role": "Basic User",
            }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn list_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server.get("/users").await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn delete_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .delete(&format!("/users/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}
