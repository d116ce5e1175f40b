//! Role and group scoped access decisions.
//!
//! Every group-scoped resource goes through the same three checks:
//! reads, writes, and admin-only operations. The decision depends only
//! on the actor's role and group, never on the resource contents, so
//! the policy is a value built once per request from the session claims.

use vigil_postgres::types::UserRole;

use crate::handler::{ErrorKind, Result};

/// Access policy for a single authenticated actor.
///
/// - Admins can read and write everything.
/// - Area admins can read and write resources in their own group only.
/// - Basic users can read resources in their own group, and write
///   nothing.
///
/// Cross-group reads fail with `NotFound` rather than `Forbidden`, so a
/// caller probing ids cannot learn whether a resource exists in another
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "policies do nothing unless queried"]
pub struct AccessPolicy {
    role: UserRole,
    group_id: i32,
}

impl AccessPolicy {
    /// Creates a policy for an actor with the given role and group.
    pub fn new(role: UserRole, group_id: i32) -> Self {
        Self { role, group_id }
    }

    /// Returns the actor's role.
    #[inline]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Returns the actor's group id.
    #[inline]
    pub fn group_id(&self) -> i32 {
        self.group_id
    }

    /// Authorizes a read of a resource in `target_group`.
    ///
    /// Cross-group reads are reported as `NotFound`.
    pub fn authorize_read(&self, target_group: i32) -> Result<()> {
        if self.role.is_admin() || self.group_id == target_group {
            return Ok(());
        }

        Err(ErrorKind::NotFound.into_error())
    }

    /// Authorizes a write to a resource in `target_group`.
    pub fn authorize_write(&self, target_group: i32) -> Result<()> {
        match self.role {
            UserRole::Admin => Ok(()),
            UserRole::AreaAdmin if self.group_id == target_group => Ok(()),
            UserRole::AreaAdmin => Err(ErrorKind::Forbidden
                .with_message("You can only modify resources in your own group")),
            UserRole::BasicUser => Err(ErrorKind::Forbidden
                .with_message("Your role does not permit modifying resources")),
        }
    }

    /// Requires the actor to be a full admin.
    pub fn require_admin(&self) -> Result<()> {
        if self.role == UserRole::Admin {
            return Ok(());
        }

        Err(ErrorKind::Forbidden.with_message("This operation requires administrator access"))
    }

    /// Returns the group filter to apply to list queries.
    ///
    /// `None` means unrestricted (admins see everything); otherwise
    /// lists must be filtered to the returned group.
    pub fn visible_scope(&self) -> Option<i32> {
        if self.role.is_admin() {
            None
        } else {
            Some(self.group_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ErrorKind;

    #[test]
    fn admin_has_full_access() {
        let policy = AccessPolicy::new(UserRole::Admin, 1);

        assert!(policy.authorize_read(2).is_ok());
        assert!(policy.authorize_write(2).is_ok());
        assert!(policy.require_admin().is_ok());
        assert_eq!(policy.visible_scope(), None);
    }

    #[test]
    fn area_admin_is_group_scoped() {
        let policy = AccessPolicy::new(UserRole::AreaAdmin, 3);

        assert!(policy.authorize_read(3).is_ok());
        assert!(policy.authorize_write(3).is_ok());

        let error = policy
            .authorize_write(4)
            .expect_err("cross-group write must fail");
        assert_eq!(error.kind(), ErrorKind::Forbidden);

        assert!(policy.require_admin().is_err());
        assert_eq!(policy.visible_scope(), Some(3));
    }

    #[test]
    fn basic_user_cannot_write_anywhere() {
        let policy = AccessPolicy::new(UserRole::BasicUser, 3);

        assert!(policy.authorize_read(3).is_ok());

        let error = policy
            .authorize_write(3)
            .expect_err("basic user write must fail");
        assert_eq!(error.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn full_decision_matrix() {
        use UserRole::{Admin, AreaAdmin, BasicUser};

        const OWN: i32 = 7;
        const FOREIGN: i32 = 8;

        // (role, target group, read allowed, write allowed)
        let cases = [
            (Admin, OWN, true, true),
            (Admin, FOREIGN, true, true),
            (AreaAdmin, OWN, true, true),
            (AreaAdmin, FOREIGN, false, false),
            (BasicUser, OWN, true, false),
            (BasicUser, FOREIGN, false, false),
        ];

        for (role, target, read_ok, write_ok) in cases {
            let policy = AccessPolicy::new(role, OWN);

            assert_eq!(
                policy.authorize_read(target).is_ok(),
                read_ok,
                "read as {role:?} into group {target}"
            );
            assert_eq!(
                policy.authorize_write(target).is_ok(),
                write_ok,
                "write as {role:?} into group {target}"
            );
            assert_eq!(policy.require_admin().is_ok(), role == Admin);
        }
    }

    #[test]
    fn cross_group_read_is_not_found() {
        let policy = AccessPolicy::new(UserRole::BasicUser, 3);

        let error = policy
            .authorize_read(4)
            .expect_err("cross-group read must fail");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }
}
