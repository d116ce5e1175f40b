//! User account model.
//!
//! Users carry the group and area scoping that the authorization layer
//! enforces, and are soft-deleted so historical audit entries keep
//! resolving to a real row.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::users;
use crate::types::UserRole;

/// A user account in the console.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login name, unique across the system.
    pub username: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Numeric group the user belongs to.
    pub group_id: i32,
    /// Human-readable name of the user's area.
    pub area_name: String,
    /// Authorization role.
    pub role: UserRole,
    /// Timestamp when the user was created.
    pub created_at: Timestamp,
    /// Timestamp when the user was last updated.
    pub updated_at: Timestamp,
    /// Timestamp when the user was soft-deleted.
    pub deleted_at: Option<Timestamp>,
}

/// Data for creating a new user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    /// Login name, unique across the system.
    pub username: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Numeric group the user belongs to.
    pub group_id: i32,
    /// Human-readable name of the user's area.
    pub area_name: String,
    /// Authorization role.
    pub role: UserRole,
}

/// Data for updating an existing user.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateUser {
    /// New login name.
    pub username: Option<String>,
    /// New Argon2 password hash.
    pub password_hash: Option<String>,
    /// New group assignment.
    pub group_id: Option<i32>,
    /// New area name.
    pub area_name: Option<String>,
    /// New authorization role.
    pub role: Option<UserRole>,
}

impl User {
    /// Returns whether the user has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns whether the user may still authenticate.
    pub fn can_login(&self) -> bool {
        !self.is_deleted()
    }

    /// Returns whether the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
