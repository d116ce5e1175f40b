//! Login token repository for magic-link issuance and redemption.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{LoginToken, NewLoginToken};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for persisted login tokens.
///
/// Tokens are immutable once issued except for the usage markers:
/// `is_used` and `used_at` are written on first redemption and never
/// change afterwards.
pub trait LoginTokenRepository {
    /// Persists a freshly issued login token.
    fn create_login_token(
        &mut self,
        new_token: NewLoginToken,
    ) -> impl Future<Output = PgResult<LoginToken>> + Send;

    /// Finds a login token by its signed token string.
    fn find_login_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = PgResult<Option<LoginToken>>> + Send;

    /// Marks a token as used, keeping the first redemption timestamp.
    ///
    /// Redeeming an already-used token leaves the record untouched, so
    /// `used_at` always reflects the first redemption.
    fn mark_login_token_used(
        &mut self,
        token_id: Uuid,
    ) -> impl Future<Output = PgResult<LoginToken>> + Send;

    /// Deletes tokens whose expiry has passed. Returns the count removed.
    fn delete_expired_login_tokens(&mut self) -> impl Future<Output = PgResult<u64>> + Send;
}

impl LoginTokenRepository for PgConnection {
    async fn create_login_token(&mut self, new_token: NewLoginToken) -> PgResult<LoginToken> {
        use schema::login_tokens;

        diesel::insert_into(login_tokens::table)
            .values(&new_token)
            .returning(LoginToken::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_login_token(&mut self, token: &str) -> PgResult<Option<LoginToken>> {
        use schema::login_tokens::{self, dsl};

        login_tokens::table
            .filter(dsl::token.eq(token))
            .select(LoginToken::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn mark_login_token_used(&mut self, token_id: Uuid) -> PgResult<LoginToken> {
        use schema::login_tokens::{self, dsl};

        let updated = diesel::update(
            login_tokens::table
                .filter(dsl::id.eq(token_id))
                .filter(dsl::is_used.eq(false)),
        )
        .set((
            dsl::is_used.eq(true),
            dsl::used_at.eq(Some(jiff_diesel::Timestamp::from(Timestamp::now()))),
        ))
        .returning(LoginToken::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?;

        match updated {
            Some(token) => Ok(token),
            // Already marked; return the current record.
            None => login_tokens::table
                .filter(dsl::id.eq(token_id))
                .select(LoginToken::as_select())
                .first(self)
                .await
                .map_err(PgError::from),
        }
    }

    async fn delete_expired_login_tokens(&mut self) -> PgResult<u64> {
        use schema::login_tokens::{self, dsl};

        let now = jiff_diesel::Timestamp::from(Timestamp::now());
        let deleted = diesel::delete(login_tokens::table.filter(dsl::expires_at.lt(now)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted as u64)
    }
}
