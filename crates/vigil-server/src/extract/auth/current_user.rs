//! Authenticated user extractor.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use derive_more::Deref;
use vigil_postgres::PgClient;
use vigil_postgres::query::UserRepository;

use super::{SessionClaims, TRACING_TARGET_AUTHENTICATION};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{SESSION_COOKIE_NAME, TokenError, TokenKeys, TokenKind};

/// The authenticated user, extracted from the session cookie.
///
/// Verifies the cookie's signature and expiry against the session
/// signing key, then confirms the user still exists: sessions are
/// stateless, so the lookup is the only thing that lets a deleted
/// account invalidate an otherwise-valid token. The claims themselves
/// stay the issue-time snapshot.
///
/// The verified state is cached in request extensions, so extracting
/// [`CurrentUser`] several times in one request verifies the token and
/// hits the database once.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct CurrentUser(pub SessionClaims);

impl CurrentUser {
    /// Returns the verified session claims.
    #[inline]
    pub fn into_claims(self) -> SessionClaims {
        self.0
    }

    /// Decodes and verifies the session token from the cookie value.
    fn verify_token(token: &str, token_keys: &TokenKeys) -> Result<SessionClaims> {
        SessionClaims::decode(token, token_keys, TokenKind::Session).map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                "session cookie verification failed"
            );

            match e {
                TokenError::InvalidFormat => ErrorKind::MalformedAuthToken
                    .with_message("The session token is malformed")
                    .with_resource("session"),
                TokenError::InvalidSignature => ErrorKind::Unauthorized
                    .with_message("The session token is invalid")
                    .with_resource("session"),
                TokenError::Expired => ErrorKind::Unauthorized
                    .with_message("Your session has expired")
                    .with_context("Please sign in again to continue")
                    .with_resource("session"),
                TokenError::Signing => ErrorKind::InternalServerError
                    .with_message("Session verification is temporarily unavailable")
                    .with_resource("session"),
            }
        })
    }

    /// Confirms the claims still map to a live user account.
    async fn verify_user_exists(claims: &SessionClaims, pg_client: &PgClient) -> Result<()> {
        let mut conn = pg_client.get_connection().await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                "database connection failed during session verification"
            );

            ErrorKind::InternalServerError
                .with_message("Session verification is temporarily unavailable")
                .with_resource("session")
        })?;

        let user = conn
            .find_user_by_username(&claims.username)
            .await
            .map_err(Error::from)?;

        if user.is_none() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                username = %claims.username,
                "valid session token for a user that no longer exists"
            );

            return Err(ErrorKind::Unauthorized
                .with_message("Your account is no longer active")
                .with_resource("session"));
        }

        Ok(())
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Sync + Send + 'static,
    TokenKeys: FromRef<S>,
    PgClient: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(current_user) = parts.extensions.get::<Self>() {
            return Ok(current_user.clone());
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE_NAME).ok_or_else(|| {
            ErrorKind::MissingAuthToken
                .with_message("Authentication is required")
                .with_resource("session")
        })?;

        let token_keys = TokenKeys::from_ref(state);
        let claims = Self::verify_token(token.value(), &token_keys)?;

        let pg_client = PgClient::from_ref(state);
        Self::verify_user_exists(&claims, &pg_client).await?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            user_id = %claims.id,
            group_id = claims.group_id,
            role = %claims.role,
            "session verified"
        );

        let current_user = Self(claims);
        parts.extensions.insert(current_user.clone());
        Ok(current_user)
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Sync + Send + 'static,
    TokenKeys: FromRef<S>,
    PgClient: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(current_user) => Ok(Some(current_user)),
            Err(_) => Ok(None),
        }
    }
}
