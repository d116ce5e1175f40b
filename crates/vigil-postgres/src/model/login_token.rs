//! Magic-link login token model.
//!
//! Each issued link is persisted with a denormalized snapshot of the
//! user's scoping at issuance time, so redemption does not depend on the
//! user row staying unchanged. Usage is tracked for observability but a
//! token remains redeemable until its expiry.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::login_tokens;
use crate::types::UserRole;

/// A persisted single-use-tracked login token.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = login_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LoginToken {
    /// Unique token record identifier.
    pub id: Uuid,
    /// User the token was issued for.
    pub user_id: Uuid,
    /// Username snapshot at issuance.
    pub username: String,
    /// Group snapshot at issuance.
    pub group_id: i32,
    /// Area name snapshot at issuance.
    pub area_name: String,
    /// Role snapshot at issuance.
    pub role: UserRole,
    /// Signed token string handed to the client.
    pub token: String,
    /// User agent of the requester, if captured.
    pub user_agent: Option<String>,
    /// Whether the token has been redeemed at least once.
    pub is_used: bool,
    /// Timestamp of the first redemption.
    pub used_at: Option<Timestamp>,
    /// Timestamp after which the token is rejected.
    pub expires_at: Timestamp,
    /// Timestamp when the token was issued.
    pub created_at: Timestamp,
}

/// Data for persisting a freshly issued login token.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = login_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLoginToken {
    /// User the token is issued for.
    pub user_id: Uuid,
    /// Username snapshot at issuance.
    pub username: String,
    /// Group snapshot at issuance.
    pub group_id: i32,
    /// Area name snapshot at issuance.
    pub area_name: String,
    /// Role snapshot at issuance.
    pub role: UserRole,
    /// Signed token string handed to the client.
    pub token: String,
    /// User agent of the requester, if captured.
    pub user_agent: Option<String>,
    /// Timestamp after which the token is rejected.
    pub expires_at: Timestamp,
}

impl LoginToken {
    /// Returns whether the persisted expiry has passed.
    pub fn is_expired(&self) -> bool {
        jiff::Timestamp::from(self.expires_at) <= jiff::Timestamp::now()
    }
}
