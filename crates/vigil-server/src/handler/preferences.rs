//! Per-user preference handlers.
//!
//! Preferences are strictly self-service: every operation applies to the
//! calling user, and the preference row is created lazily on first write.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;
use vigil_postgres::query::UserPreferenceRepository;

use crate::extract::{CurrentUser, Json, PgPool, ValidateJson};
use crate::handler::{ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for preference operations.
const TRACING_TARGET: &str = "vigil_server::handler::preferences";

/// The caller's default view selection.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct DefaultViewResponse {
    /// View group shown by default after login, or `null` if unset.
    pub default_view_id: Option<String>,
}

/// Returns the caller's default view selection.
///
/// A user without a preference row simply has no default view; that is
/// not an error.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/preferences/default-view", tag = "preferences",
    responses(
        (status = OK, description = "Current default view", body = DefaultViewResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn get_default_view(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
) -> Result<Json<DefaultViewResponse>> {
    let preference = conn.find_user_preference(claims.id).await?;

    let response = DefaultViewResponse {
        default_view_id: preference.and_then(|p| p.default_view_id),
    };
    Ok(Json(response))
}

/// Request payload for changing the default view.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateDefaultViewRequest {
    /// New default view, or `null` to clear the selection.
    #[validate(length(min = 1, max = 128))]
    pub default_view_id: Option<String>,
}

/// Sets or clears the caller's default view.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/preferences/default-view", tag = "preferences",
    request_body(
        content = UpdateDefaultViewRequest,
        description = "Default view to store",
        content_type = "application/json",
    ),
    responses(
        (status = OK, description = "Default view stored", body = DefaultViewResponse),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Unauthorized", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn update_default_view(
    CurrentUser(claims): CurrentUser,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<UpdateDefaultViewRequest>,
) -> Result<Json<DefaultViewResponse>> {
    let preference = conn
        .upsert_default_view(claims.id, &claims.username, request.default_view_id)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        user_id = %claims.id,
        default_view_id = ?preference.default_view_id,
        "default view updated"
    );

    let response = DefaultViewResponse {
        default_view_id: preference.default_view_id,
    };
    Ok(Json(response))
}

/// Returns a [`Router`] with all preference routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(get_default_view, update_default_view))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn get_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server.get("/preferences/default-view").await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn put_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .put("/preferences/default-view")
            .json(&json!({ "defaultViewId": "hq-wall" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}
