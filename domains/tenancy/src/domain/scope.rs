//! Organization scope validation
//!
//! Decides whether an actor's memberships cover the organizations a request
//! touches. The check fails closed for membership-bound actors: an empty
//! target set is a violation, not a pass. Full-access actors are exempt.

use habitek_common::{Error, Result};
use uuid::Uuid;

use crate::domain::entities::{Actor, OrganizationKind};
use crate::domain::roles::Role;

/// One organization the request wants to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgScopeTarget {
    pub organization_id: Uuid,
    pub kind: OrganizationKind,
}

/// Validate that `actor` may act on every organization in `targets`.
///
/// Full-access actors (admins, or memberships flagged `full_access`) bypass
/// the membership intersection. Demo managers are additionally confined to
/// demo organizations even with matching memberships.
pub fn has_scope(actor: &Actor, targets: &[OrgScopeTarget]) -> Result<()> {
    if actor.role == Role::DemoManager {
        if let Some(outside) = targets.iter().find(|t| t.kind != OrganizationKind::Demo) {
            tracing::debug!(
                actor_id = %actor.user_id,
                organization_id = %outside.organization_id,
                "demo manager attempted to act outside the demo partition"
            );
            return Err(Error::DemoScopeViolation);
        }
    }

    if actor.has_full_access() {
        return Ok(());
    }

    if targets.is_empty() {
        return Err(Error::OrganizationScopeViolation);
    }

    for target in targets {
        if !actor.belongs_to(target.organization_id) {
            tracing::debug!(
                actor_id = %actor.user_id,
                organization_id = %target.organization_id,
                "organization outside actor scope"
            );
            return Err(Error::OrganizationScopeViolation);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ActorMembership;

    fn actor(role: Role, orgs: Vec<ActorMembership>) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            role,
            memberships: orgs,
            residence_ids: vec![],
        }
    }

    fn membership(org_id: Uuid, kind: OrganizationKind) -> ActorMembership {
        ActorMembership {
            organization_id: org_id,
            kind,
            role: Role::Manager,
            full_access: false,
        }
    }

    fn target(org_id: Uuid, kind: OrganizationKind) -> OrgScopeTarget {
        OrgScopeTarget {
            organization_id: org_id,
            kind,
        }
    }

    #[test]
    fn member_passes_for_own_organization() {
        let org = Uuid::new_v4();
        let a = actor(
            Role::Manager,
            vec![membership(org, OrganizationKind::Standard)],
        );
        assert!(has_scope(&a, &[target(org, OrganizationKind::Standard)]).is_ok());
    }

    #[test]
    fn non_member_is_denied() {
        let a = actor(
            Role::Manager,
            vec![membership(Uuid::new_v4(), OrganizationKind::Standard)],
        );
        let result = has_scope(&a, &[target(Uuid::new_v4(), OrganizationKind::Standard)]);
        assert!(matches!(result, Err(Error::OrganizationScopeViolation)));
    }

    #[test]
    fn every_target_must_be_covered() {
        let org = Uuid::new_v4();
        let a = actor(
            Role::Manager,
            vec![membership(org, OrganizationKind::Standard)],
        );
        let targets = [
            target(org, OrganizationKind::Standard),
            target(Uuid::new_v4(), OrganizationKind::Standard),
        ];
        assert!(matches!(
            has_scope(&a, &targets),
            Err(Error::OrganizationScopeViolation)
        ));
    }

    #[test]
    fn empty_target_set_fails_closed_for_members() {
        let a = actor(
            Role::Manager,
            vec![membership(Uuid::new_v4(), OrganizationKind::Standard)],
        );
        assert!(matches!(
            has_scope(&a, &[]),
            Err(Error::OrganizationScopeViolation)
        ));
    }

    #[test]
    fn admin_passes_with_empty_target_set() {
        let a = actor(Role::Admin, vec![]);
        assert!(has_scope(&a, &[]).is_ok());
    }

    #[test]
    fn demo_manager_fails_closed_on_empty_target_set() {
        let a = actor(
            Role::DemoManager,
            vec![membership(Uuid::new_v4(), OrganizationKind::Demo)],
        );
        assert!(matches!(
            has_scope(&a, &[]),
            Err(Error::OrganizationScopeViolation)
        ));
    }

    #[test]
    fn admin_bypasses_membership_intersection() {
        let a = actor(Role::Admin, vec![]);
        assert!(has_scope(&a, &[target(Uuid::new_v4(), OrganizationKind::Standard)]).is_ok());
    }

    #[test]
    fn full_access_membership_bypasses_intersection() {
        let mut m = membership(Uuid::new_v4(), OrganizationKind::Standard);
        m.full_access = true;
        let a = actor(Role::Manager, vec![m]);
        assert!(has_scope(&a, &[target(Uuid::new_v4(), OrganizationKind::Standard)]).is_ok());
    }

    #[test]
    fn demo_manager_confined_to_demo_organizations() {
        let org = Uuid::new_v4();
        let a = actor(
            Role::DemoManager,
            vec![membership(org, OrganizationKind::Standard)],
        );
        // Member of the org, but the org is not demo
        assert!(matches!(
            has_scope(&a, &[target(org, OrganizationKind::Standard)]),
            Err(Error::DemoScopeViolation)
        ));
    }

    #[test]
    fn demo_manager_passes_within_demo_partition() {
        let org = Uuid::new_v4();
        let a = actor(Role::DemoManager, vec![membership(org, OrganizationKind::Demo)]);
        assert!(has_scope(&a, &[target(org, OrganizationKind::Demo)]).is_ok());
    }

    #[test]
    fn demo_rule_applies_before_full_access() {
        let mut m = membership(Uuid::new_v4(), OrganizationKind::Demo);
        m.full_access = true;
        let a = actor(Role::DemoManager, vec![m]);
        assert!(matches!(
            has_scope(&a, &[target(Uuid::new_v4(), OrganizationKind::Other)]),
            Err(Error::DemoScopeViolation)
        ));
    }
}
