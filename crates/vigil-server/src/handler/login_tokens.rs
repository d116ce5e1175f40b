//! Magic-link login token handlers: generation and redemption.
//!
//! A magic link carries a signed token that is also persisted, so
//! redemption can check the stored expiry and record first use. Usage
//! tracking is observational: a link stays redeemable until its expiry
//! even after it has been used once.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::UserAgent;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;
use vigil_postgres::PgConn;
use vigil_postgres::model::NewLoginToken;
use vigil_postgres::query::{LoginTokenRepository, UserRepository};

use super::authentication::{invalid_credentials, token_signing_failed};
use crate::extract::{Json, PgPool, SessionClaims, ValidateJson, build_session_cookie};
use crate::handler::{Error, ErrorKind, ErrorResponse, Result, UserProfile};
use crate::service::{
    PasswordHasher, ServiceState, SessionSettings, TokenCodec, TokenError, TokenKeys, TokenKind,
};

/// Tracing target for login token operations.
const TRACING_TARGET: &str = "vigil_server::handler::login_tokens";

/// The one error returned when a presented token is not recognized.
fn invalid_token() -> Error<'static> {
    ErrorKind::Unauthorized
        .with_message("The login link is invalid")
        .with_resource("login_token")
}

/// Redeems a persisted login token and returns its claims.
///
/// Checks run in a fixed order: presence, database lookup by the exact
/// token string, stored expiry, then signature. Only after all four
/// pass is first use recorded; the recording never blocks redemption,
/// so a second redemption yields the same claims.
async fn redeem_login_token(
    conn: &mut PgConn,
    token_keys: &TokenKeys,
    token: &str,
) -> Result<SessionClaims> {
    if token.is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("A login token is required")
            .with_resource("login_token"));
    }

    let Some(record) = conn.find_login_token(token).await? else {
        tracing::debug!(
            target: TRACING_TARGET,
            "redemption attempt with an unknown token"
        );
        return Err(invalid_token());
    };

    if record.is_expired() {
        tracing::debug!(
            target: TRACING_TARGET,
            token_id = %record.id,
            user_id = %record.user_id,
            "redemption attempt with an expired token"
        );
        return Err(ErrorKind::Unauthorized
            .with_message("The login link has expired")
            .with_context("Request a new login link to continue")
            .with_resource("login_token"));
    }

    let claims: SessionClaims = TokenCodec::decode(token, token_keys.key(TokenKind::MagicLink))
        .map_err(|e| match e {
            TokenError::InvalidFormat => ErrorKind::MalformedAuthToken
                .with_message("The login token is malformed")
                .with_resource("login_token"),
            TokenError::InvalidSignature | TokenError::Expired => invalid_token(),
            TokenError::Signing => ErrorKind::InternalServerError
                .with_message("Login link verification is temporarily unavailable")
                .with_resource("login_token"),
        })?;

    if record.is_used {
        tracing::info!(
            target: TRACING_TARGET,
            token_id = %record.id,
            user_id = %record.user_id,
            "login token redeemed again after first use"
        );
    }

    let marked = conn.mark_login_token_used(record.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        token_id = %marked.id,
        user_id = %marked.user_id,
        first_use = !record.is_used,
        "login token redeemed"
    );

    Ok(claims)
}

/// Request payload for generating a magic link.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct GenerateTokenRequest {
    /// Login name of the account the link is for.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Password of that account.
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

/// Response returned when a magic link has been generated.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct GenerateTokenResponse {
    /// The signed login token.
    pub token: String,
    /// Ready-to-share login link pointing at the frontend.
    pub login_url: String,
}

/// Generates a magic-link login token.
///
/// Authenticates with username and password in the body, signs a token
/// with the magic-link key, and persists it alongside a snapshot of the
/// user's scoping at issuance.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/tokens", tag = "login_tokens",
    request_body(
        content = GenerateTokenRequest,
        description = "Credentials of the account to issue a link for",
        content_type = "application/json",
    ),
    responses(
        (status = CREATED, description = "Login link generated", body = GenerateTokenResponse),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Invalid credentials", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn generate_login_token(
    State(password_hasher): State<PasswordHasher>,
    State(token_keys): State<TokenKeys>,
    State(session_settings): State<SessionSettings>,
    user_agent: Option<TypedHeader<UserAgent>>,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<GenerateTokenRequest>,
) -> Result<(StatusCode, Json<GenerateTokenResponse>)> {
    let username = request.username.trim();

    // Opportunistic cleanup: expired links are dead weight and never
    // redeemable, so failures here only get logged.
    match conn.delete_expired_login_tokens().await {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(
            target: TRACING_TARGET,
            removed,
            "removed expired login tokens"
        ),
        Err(e) => tracing::error!(
            target: TRACING_TARGET,
            error = %e,
            "failed to remove expired login tokens"
        ),
    }

    let Some(user) = conn.find_user_by_username(username).await? else {
        password_hasher.verify_dummy_password(&request.password);
        return Err(invalid_credentials());
    };

    password_hasher
        .verify_password(&request.password, &user.password_hash)
        .map_err(|e| match e.kind() {
            ErrorKind::Unauthorized => invalid_credentials(),
            _ => e,
        })?;

    let claims = SessionClaims::for_user(&user, session_settings.login_token_lifetime_secs);
    let token = claims
        .encode(&token_keys, TokenKind::MagicLink)
        .map_err(token_signing_failed)?;

    let expires_at = jiff::Timestamp::from_second(claims.exp).map_err(|e| {
        tracing::error!(
            target: TRACING_TARGET,
            error = %e,
            "computed token expiry is out of range"
        );
        ErrorKind::InternalServerError.into_error()
    })?;

    let new_token = NewLoginToken {
        user_id: user.id,
        username: user.username.clone(),
        group_id: user.group_id,
        area_name: user.area_name.clone(),
        role: user.role,
        token: token.clone(),
        user_agent: user_agent.map(|TypedHeader(ua)| ua.to_string()),
        expires_at: expires_at.into(),
    };
    let record = conn.create_login_token(new_token).await?;

    let mut login_url = session_settings.frontend_url.clone();
    login_url.set_path("/auth/verify");
    login_url.set_query(Some(&format!("token={}", token)));

    tracing::info!(
        target: TRACING_TARGET,
        token_id = %record.id,
        user_id = %user.id,
        expires_at = %expires_at,
        "login token generated"
    );

    let response = GenerateTokenResponse {
        token,
        login_url: login_url.into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Request payload for API-side token redemption.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct VerifyTokenRequest {
    /// The signed login token from the link.
    #[validate(length(min = 1))]
    pub token: String,
}

/// Response returned for a successfully redeemed token.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct VerifyTokenResponse {
    /// Identity snapshot carried by the token.
    pub user: UserProfile,
}

/// Redeems a login token and returns the identity it carries.
///
/// Does not establish a session; callers that want a browser session
/// use the redirect endpoint instead.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/tokens/verify", tag = "login_tokens",
    request_body(
        content = VerifyTokenRequest,
        description = "Token to redeem",
        content_type = "application/json",
    ),
    responses(
        (status = OK, description = "Token redeemed", body = VerifyTokenResponse),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Invalid or expired token", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn verify_login_token(
    State(token_keys): State<TokenKeys>,
    PgPool(mut conn): PgPool,
    ValidateJson(request): ValidateJson<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>> {
    let claims = redeem_login_token(&mut conn, &token_keys, &request.token).await?;

    let response = VerifyTokenResponse {
        user: UserProfile::from(&claims),
    };
    Ok(Json(response))
}

/// Query parameters for browser-side token redemption.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct BrowserVerifyQuery {
    /// The signed login token from the link.
    #[serde(default)]
    pub token: String,
}

/// Redeems a login token from a browser and starts a session.
///
/// Issues a fresh session token for the user behind the link — the
/// magic-link token itself never doubles as a session — sets the
/// session cookie, and redirects to the frontend.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/auth/verify", tag = "login_tokens",
    params(BrowserVerifyQuery),
    responses(
        (status = SEE_OTHER, description = "Session started, redirecting"),
        (status = BAD_REQUEST, description = "Bad request", body = ErrorResponse),
        (status = UNAUTHORIZED, description = "Invalid or expired token", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Internal server error", body = ErrorResponse),
    ),
)]
async fn redeem_login_link(
    State(token_keys): State<TokenKeys>,
    State(session_settings): State<SessionSettings>,
    PgPool(mut conn): PgPool,
    Query(query): Query<BrowserVerifyQuery>,
) -> Result<(CookieJar, Redirect)> {
    let claims = redeem_login_token(&mut conn, &token_keys, &query.token).await?;

    // The session is issued for the user's current state, not the
    // snapshot inside the link.
    let Some(user) = conn.find_user_by_username(&claims.username).await? else {
        tracing::warn!(
            target: TRACING_TARGET,
            user_id = %claims.id,
            "login link redeemed for a user that no longer exists"
        );
        return Err(invalid_token());
    };

    let session_claims = SessionClaims::for_user(&user, session_settings.session_lifetime_secs);
    let session_token = session_claims
        .encode(&token_keys, TokenKind::Session)
        .map_err(token_signing_failed)?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        "session started from a login link"
    );

    let jar = CookieJar::new().add(build_session_cookie(
        session_token,
        session_settings.session_lifetime_secs,
    ));

    Ok((jar, Redirect::to(session_settings.frontend_url.as_str())))
}

/// Returns a [`Router`] with all login token routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(generate_login_token))
        .routes(routes!(verify_login_token))
        .routes(routes!(redeem_login_link))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;
    use vigil_postgres::model::NewUser;
    use vigil_postgres::types::UserRole;

    use super::*;
    use crate::handler::test::create_test_server_with_router;
    use crate::service::ServiceConfig;

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn verify_rejects_missing_token() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/auth/tokens/verify")
            .json(&json!({ "token": "" }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn verify_rejects_unknown_token() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/auth/tokens/verify")
            .json(&json!({ "token": "aaa.bbb.ccc" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn redemption_repeats_but_first_use_sticks() -> anyhow::Result<()> {
        let state = ServiceState::from_config(&ServiceConfig::default()).await?;
        let mut conn = state.postgres.get_connection().await?;

        let user = conn
            .create_user(NewUser {
                username: format!("magic-{}", Uuid::new_v4()),
                password_hash: "unused-in-redemption-tests".into(),
                group_id: 1,
                area_name: "North".into(),
                role: UserRole::BasicUser,
            })
            .await?;

        let claims = SessionClaims::for_user(&user, state.session_settings.login_token_lifetime_secs);
        let token = claims.encode(&state.token_keys, TokenKind::MagicLink)?;
        let expires_at = jiff::Timestamp::from_second(claims.exp)?;
        conn.create_login_token(NewLoginToken {
            user_id: user.id,
            username: user.username.clone(),
            group_id: user.group_id,
            area_name: user.area_name.clone(),
            role: user.role,
            token: token.clone(),
            user_agent: None,
            expires_at: expires_at.into(),
        })
        .await?;

        let first = redeem_login_token(&mut conn, &state.token_keys, &token).await?;
        let after_first = conn.find_login_token(&token).await?.expect("persisted");
        assert!(after_first.is_used);
        let first_used_at =
            jiff::Timestamp::from(after_first.used_at.expect("marked on first use"));

        // A second redemption succeeds with the same claims and leaves
        // the first-use marker untouched.
        let second = redeem_login_token(&mut conn, &state.token_keys, &token).await?;
        assert_eq!(first, second);

        let after_second = conn.find_login_token(&token).await?.expect("persisted");
        assert!(after_second.is_used);
        let second_used_at =
            jiff::Timestamp::from(after_second.used_at.expect("still marked"));
        assert_eq!(second_used_at, first_used_at);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn generate_requires_valid_credentials() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server
            .post("/auth/tokens")
            .json(&json!({ "username": "no-such-user", "password": "whatever1" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}
