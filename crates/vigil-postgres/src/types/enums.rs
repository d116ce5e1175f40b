//! Postgres-backed enum types shared across models and the API surface.

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

/// Role a user holds within the console.
///
/// Roles form a closed set; unknown role strings fail parsing instead of
/// silently degrading to the least-privileged role. The serialized wire
/// values match what the frontend has historically sent and stored in
/// issued tokens, so they are not snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DbEnum)]
#[derive(Serialize, Deserialize, strum::Display, strum::EnumString, strum::EnumIter)]
#[cfg_attr(feature = "schema", derive(utoipa::ToSchema))]
#[ExistingTypePath = "crate::schema::sql_types::UserRole"]
pub enum UserRole {
    /// Full administrative access across all areas.
    #[serde(rename = "admin")]
    #[strum(serialize = "admin")]
    Admin,
    /// Manages resources within their own area only.
    #[serde(rename = "Area Admin")]
    #[strum(serialize = "Area Admin")]
    AreaAdmin,
    /// Read-only access scoped to their own area.
    #[serde(rename = "Basic User")]
    #[strum(serialize = "Basic User")]
    BasicUser,
}

impl UserRole {
    /// Returns whether this role grants unrestricted access.
    #[inline]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Kind of mutation recorded in the view-group audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DbEnum)]
#[derive(Serialize, Deserialize, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "schema", derive(utoipa::ToSchema))]
#[ExistingTypePath = "crate::schema::sql_types::AuditAction"]
pub enum AuditAction {
    /// A view group was created.
    #[serde(rename = "CREATE")]
    #[strum(serialize = "CREATE")]
    Create,
    /// A view group was updated.
    #[serde(rename = "UPDATE")]
    #[strum(serialize = "UPDATE")]
    Update,
    /// A view group was deleted.
    #[serde(rename = "DELETE")]
    #[strum(serialize = "DELETE")]
    Delete,
}

/// Rendering source of a custom map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DbEnum)]
#[derive(Serialize, Deserialize, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "schema", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[ExistingTypePath = "crate::schema::sql_types::MapKind"]
pub enum MapKind {
    /// Static uploaded floor-plan image.
    Image,
    /// Raster tile server.
    Raster,
    /// Vector style URL.
    Vector,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn user_role_wire_values_round_trip() {
        for (role, wire) in [
            (UserRole::Admin, "\"admin\""),
            (UserRole::AreaAdmin, "\"Area Admin\""),
            (UserRole::BasicUser, "\"Basic User\""),
        ] {
            assert_eq!(serde_json::to_string(&role).unwrap(), wire);
            assert_eq!(serde_json::from_str::<UserRole>(wire).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_fails_closed() {
        assert!(UserRole::from_str("superuser").is_err());
        assert!(serde_json::from_str::<UserRole>("\"superuser\"").is_err());
    }

    #[test]
    fn audit_action_wire_values() {
        assert_eq!(AuditAction::Create.to_string(), "CREATE");
        assert_eq!(
            serde_json::to_string(&AuditAction::Delete).unwrap(),
            "\"DELETE\""
        );
    }
}
