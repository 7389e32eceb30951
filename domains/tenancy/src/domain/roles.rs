//! Role hierarchy and assignment rules
//!
//! Roles are split into a standard partition and a demo partition that
//! mirrors it for sandbox organizations. `can_assign` is the single table
//! deciding who may invite whom; every invitation path goes through it.

use habitek_common::{Error, Result};
use serde::{Deserialize, Serialize};

use habitek_auth::AuthRole;

/// Platform roles as stored in the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Tenant,
    Resident,
    DemoManager,
    DemoTenant,
    DemoResident,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Manager,
        Role::Tenant,
        Role::Resident,
        Role::DemoManager,
        Role::DemoTenant,
        Role::DemoResident,
    ];

    /// Whether this role belongs to the demo partition.
    pub fn is_demo(&self) -> bool {
        matches!(
            self,
            Role::DemoManager | Role::DemoTenant | Role::DemoResident
        )
    }

    /// Display label used in emails, per language.
    pub fn label(&self, french: bool) -> &'static str {
        match (self, french) {
            (Role::Admin, true) => "administrateur",
            (Role::Admin, false) => "administrator",
            (Role::Manager, true) | (Role::DemoManager, true) => "gestionnaire",
            (Role::Manager, false) | (Role::DemoManager, false) => "manager",
            (Role::Tenant, true) | (Role::DemoTenant, true) => "locataire",
            (Role::Tenant, false) | (Role::DemoTenant, false) => "tenant",
            (Role::Resident, true) | (Role::DemoResident, true) => "résident",
            (Role::Resident, false) | (Role::DemoResident, false) => "resident",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Tenant => "tenant",
            Role::Resident => "resident",
            Role::DemoManager => "demo_manager",
            Role::DemoTenant => "demo_tenant",
            Role::DemoResident => "demo_resident",
        };
        write!(f, "{}", s)
    }
}

impl From<AuthRole> for Role {
    fn from(role: AuthRole) -> Self {
        match role {
            AuthRole::Admin => Role::Admin,
            AuthRole::Manager => Role::Manager,
            AuthRole::Tenant => Role::Tenant,
            AuthRole::Resident => Role::Resident,
            AuthRole::DemoManager => Role::DemoManager,
            AuthRole::DemoTenant => Role::DemoTenant,
            AuthRole::DemoResident => Role::DemoResident,
        }
    }
}

/// Decide whether `actor_role` may assign `target_role` through an
/// invitation.
///
/// - Admins assign any role.
/// - Managers assign manager, tenant, and resident. Attempting admin is a
///   distinct escalation error; demo roles are outside their partition.
/// - Demo managers assign only demo roles.
/// - Every other role cannot invite at all.
pub fn can_assign(actor_role: Role, target_role: Role) -> Result<()> {
    match actor_role {
        Role::Admin => Ok(()),
        Role::Manager => match target_role {
            Role::Manager | Role::Tenant | Role::Resident => Ok(()),
            Role::Admin => Err(Error::RoleEscalationDenied),
            _ => Err(Error::InvalidRoleAssignment),
        },
        Role::DemoManager => {
            if target_role.is_demo() {
                Ok(())
            } else {
                Err(Error::InvalidDemoRoleAssignment)
            }
        }
        Role::Tenant | Role::Resident | Role::DemoTenant | Role::DemoResident => {
            Err(Error::InsufficientPermissions)
        }
    }
}
