use uuid::Uuid;

use crate::types::{AuthIdentity, AuthMembership};

/// Everything handlers need to make authorization decisions for one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
    pub memberships: Vec<AuthMembership>,
    pub residence_ids: Vec<Uuid>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// True when any membership grants unrestricted access across the
    /// platform. Admin accounts always qualify.
    pub fn has_full_access(&self) -> bool {
        self.is_admin() || self.memberships.iter().any(|m| m.full_access)
    }

    pub fn organization_ids(&self) -> Vec<Uuid> {
        self.memberships.iter().map(|m| m.organization_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthOrgKind, AuthRole};

    fn identity(role: AuthRole) -> AuthIdentity {
        AuthIdentity {
            id: Uuid::new_v4(),
            email: "test@habitek.ca".to_string(),
            role,
            first_name: None,
            last_name: None,
        }
    }

    fn membership(full_access: bool) -> AuthMembership {
        AuthMembership {
            organization_id: Uuid::new_v4(),
            organization_name: "Syndicat Le Plateau".to_string(),
            organization_kind: AuthOrgKind::Standard,
            role: AuthRole::Manager,
            full_access,
        }
    }

    #[test]
    fn admin_has_full_access_without_memberships() {
        let ctx = AuthContext {
            user: identity(AuthRole::Admin),
            memberships: vec![],
            residence_ids: vec![],
        };
        assert!(ctx.has_full_access());
    }

    #[test]
    fn full_access_membership_grants_full_access() {
        let ctx = AuthContext {
            user: identity(AuthRole::Manager),
            memberships: vec![membership(true)],
            residence_ids: vec![],
        };
        assert!(ctx.has_full_access());
    }

    #[test]
    fn plain_manager_has_no_full_access() {
        let ctx = AuthContext {
            user: identity(AuthRole::Manager),
            memberships: vec![membership(false)],
            residence_ids: vec![],
        };
        assert!(!ctx.has_full_access());
        assert_eq!(ctx.organization_ids().len(), 1);
    }
}
