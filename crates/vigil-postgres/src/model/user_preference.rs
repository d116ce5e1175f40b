//! Per-user console preferences.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::user_preferences;

/// Preferences stored for a single user, one row per user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserPreference {
    /// Unique preference row identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Username snapshot for quick display.
    pub username: String,
    /// View group shown by default after login, if chosen.
    pub default_view_id: Option<String>,
    /// Timestamp when the row was created.
    pub created_at: Timestamp,
    /// Timestamp when the row was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a preference row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUserPreference {
    /// Owning user.
    pub user_id: Uuid,
    /// Username snapshot for quick display.
    pub username: String,
    /// View group shown by default after login.
    pub default_view_id: Option<String>,
}

/// Data for updating a preference row.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = user_preferences)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateUserPreference {
    /// New default view, or `None` to clear it.
    pub default_view_id: Option<String>,
}
