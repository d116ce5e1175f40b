use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vigil_postgres::model::User;
use vigil_postgres::types::UserRole;

use crate::extract::SessionClaims;

/// Public identity of a user, shared by several handlers.
///
/// Never carries the password hash.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique user identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Numeric group the user belongs to.
    pub group_id: i32,
    /// Human-readable area name.
    pub area_name: String,
    /// Authorization role.
    pub role: UserRole,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            group_id: user.group_id,
            area_name: user.area_name.clone(),
            role: user.role,
        }
    }
}

impl From<User> for UserProfile {
    #[inline]
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&SessionClaims> for UserProfile {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            id: claims.id,
            username: claims.username.clone(),
            group_id: claims.group_id,
            area_name: claims.area_name.clone(),
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_never_leaks_credentials() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            username: "operator".to_string(),
            group_id: 3,
            area_name: "North Yard".to_string(),
            role: UserRole::BasicUser,
        };

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("groupId"));
        assert!(json.contains("areaName"));
        assert!(!json.contains("password"));
    }
}
