//! User preference repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewUserPreference, UserPreference};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for per-user preferences.
pub trait UserPreferenceRepository {
    /// Finds the preference row for a user.
    fn find_user_preference(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<UserPreference>>> + Send;

    /// Sets or clears a user's default view, creating the preference row
    /// on first write.
    fn upsert_default_view(
        &mut self,
        user_id: Uuid,
        username: &str,
        default_view_id: Option<String>,
    ) -> impl Future<Output = PgResult<UserPreference>> + Send;
}

impl UserPreferenceRepository for PgConnection {
    async fn find_user_preference(&mut self, user_id: Uuid) -> PgResult<Option<UserPreference>> {
        use schema::user_preferences::{self, dsl};

        user_preferences::table
            .filter(dsl::user_id.eq(user_id))
            .select(UserPreference::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn upsert_default_view(
        &mut self,
        user_id: Uuid,
        username: &str,
        default_view_id: Option<String>,
    ) -> PgResult<UserPreference> {
        use schema::user_preferences::{self, dsl};

        let new_preference = NewUserPreference {
            user_id,
            username: username.to_owned(),
            default_view_id: default_view_id.clone(),
        };

        diesel::insert_into(user_preferences::table)
            .values(&new_preference)
            .on_conflict(dsl::user_id)
            .do_update()
            .set(dsl::default_view_id.eq(default_view_id))
            .returning(UserPreference::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}
