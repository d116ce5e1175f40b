//! Session authentication handlers: login, logout, and introspection.

use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;
use vigil_postgres::query::UserRepository;

use crate::extract::{
    CurrentUser, Json, PgPool, SessionClaims, ValidateJson, build_session_cookie,
    build_session_removal_cookie,
};
use crate::handler::{Error, ErrorKind, ErrorResponse, Result, UserProfile};
use crate::service::{PasswordHasher, ServiceState, SessionSettings, TokenKeys, TokenKind};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "vigil_server::handler::authentication";

/// The one error returned for any credential failure.
///
/// Unknown username and wrong password must be indistinguishable, so
/// both paths converge here.
pub(crate) fn invalid_credentials() -> Error<'static> {
    ErrorKind::Unauthorized
        .with_message("Invalid username or password")
        .with_resource("authentication")
}

/// Maps a token signing failure onto an opaque server error.
pub(crate) fn token_signing_failed(error: crate::service::TokenError) -> Error<'static> {
    tracing::error!(
        target: TRACING_TARGET,
        error = %error,
        "failed to sign a token"
    );

    ErrorKind::InternalServerError
        .with_message("Sign-in is temporarily unavailable")
        .with_resource("authentication")
}

/// Request payload for signing in.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    /// Login name.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Plaintext password, verified against the stored hash.
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

/// Response returned on a successful login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    /// Identity of the signed-in user.
    pub user: UserProfile,
}

/// Signs a user in and sets the session cookie.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/login", tag = "authentication",
    request_body(
        content = LoginRequest,
        description = "Login credentials",
        content_type = "application/json",
    ),
    responses(
        (status = OK, description = "Signed in", body = LoginResponse),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Invalid credentials", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn login(
    State(password_hasher): State<PasswordHasher>,
    State(token_keys): State<TokenKeys>,
    State(session_settings): State<SessionSettings>,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let username = request.username.trim();

    let Some(user) = conn.find_user_by_username(username).await? else {
        // Burn the same hashing time an existing account would, so the
        // response latency does not reveal whether the account exists.
        password_hasher.verify_dummy_password(&request.password);

        tracing::debug!(
            target: TRACING_TARGET,
            "login attempt for unknown username"
        );

        return Err(invalid_credentials());
    };

    password_hasher
        .verify_password(&request.password, &user.password_hash)
        .map_err(|e| match e.kind() {
            ErrorKind::Unauthorized => invalid_credentials(),
            _ => e,
        })?;

    let claims = SessionClaims::for_user(&user, session_settings.session_lifetime_secs);
    let token = claims
        .encode(&token_keys, TokenKind::Session)
        .map_err(token_signing_failed)?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        group_id = user.group_id,
        role = %user.role,
        "user signed in"
    );

    let jar = CookieJar::new().add(build_session_cookie(
        token,
        session_settings.session_lifetime_secs,
    ));

    let response = LoginResponse { user: user.into() };
    Ok((jar, Json(response)))
}

/// Response returned when a session is cleared.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LogoutResponse {
    /// Always `true`; logout cannot fail.
    pub success: bool,
}

/// Clears the session cookie.
///
/// Sessions are stateless, so there is nothing to revoke server-side;
/// the removal cookie is the whole operation.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/logout", tag = "authentication",
    responses(
        (status = OK, description = "Session cleared", body = LogoutResponse),
    ),
)]
async fn logout() -> (CookieJar, Json<LogoutResponse>) {
    let jar = CookieJar::new().add(build_session_removal_cookie());
    (jar, Json(LogoutResponse { success: true }))
}

/// Response describing the current session.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    /// Identity of the signed-in user, or `null` without a valid session.
    pub user: Option<UserProfile>,
}

/// Returns the identity behind the session cookie, if any.
///
/// Re-fetches the user row so the response reflects current data rather
/// than the issue-time snapshot inside the token.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/auth/session", tag = "authentication",
    responses(
        (status = OK, description = "Current session", body = SessionResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn get_session(
    current_user: Option<CurrentUser>,
    PgPool(mut conn): PgPool,
) -> Result<Json<SessionResponse>> {
    let Some(CurrentUser(claims)) = current_user else {
        return Ok(Json(SessionResponse { user: None }));
    };

    let user = conn
        .find_user_by_username(&claims.username)
        .await
        .map_err(Error::from)?
        .map(UserProfile::from);

    Ok(Json(SessionResponse { user }))
}

/// Returns a [`Router`] with all authentication routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(get_session))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn login_with_unknown_user_is_unauthorized() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "no-such-user", "password": "whatever1" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn login_rejects_empty_credentials() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "", "password": "" }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn session_without_cookie_is_anonymous() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server.get("/auth/session").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert!(body["user"].is_null());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn logout_clears_the_session_cookie() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server.post("/auth/logout").await;
        response.assert_status_ok();

        let cookie = response.cookie(crate::service::SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        Ok(())
    }
}
