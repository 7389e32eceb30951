use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform roles, split into a standard and a demo partition. Mirrors the
/// `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthRole {
    Admin,
    Manager,
    Tenant,
    Resident,
    DemoManager,
    DemoTenant,
    DemoResident,
}

impl AuthRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthRole::Admin)
    }

    pub fn is_demo(&self) -> bool {
        matches!(
            self,
            AuthRole::DemoManager | AuthRole::DemoTenant | AuthRole::DemoResident
        )
    }
}

/// Mirrors the `organization_kind` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "organization_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthOrgKind {
    Standard,
    Demo,
    Other,
}

/// The authenticated user's row, minus credentials.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: AuthRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// One organization the user belongs to, joined with the organization row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthMembership {
    pub organization_id: Uuid,
    pub organization_name: String,
    pub organization_kind: AuthOrgKind,
    pub role: AuthRole,
    pub full_access: bool,
}
