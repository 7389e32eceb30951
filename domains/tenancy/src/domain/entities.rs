//! Domain entities for the tenancy domain
//!
//! Entities validate their own construction rules and derive invitation
//! state from timestamps rather than storing it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use habitek_auth::{AuthContext, AuthOrgKind};
use habitek_common::{Error, Result};
use validator::ValidateEmail;

use crate::domain::roles::Role;
use crate::domain::state::{
    InvitationEvent, InvitationGuardContext, InvitationState, InvitationStateMachine,
};
use crate::domain::token::TokenIssuer;
use habitek_common::StateError;

/// Maximum length of the optional personal message on an invitation.
pub const MAX_PERSONAL_MESSAGE_LEN: usize = 500;

/// Organization partitions as stored in the `organization_kind` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "organization_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrganizationKind {
    #[default]
    Standard,
    Demo,
    Other,
}

impl From<AuthOrgKind> for OrganizationKind {
    fn from(kind: AuthOrgKind) -> Self {
        match kind {
            AuthOrgKind::Standard => OrganizationKind::Standard,
            AuthOrgKind::Demo => OrganizationKind::Demo,
            AuthOrgKind::Other => OrganizationKind::Other,
        }
    }
}

/// Organization entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub kind: OrganizationKind,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: String, kind: OrganizationKind) -> Result<Self> {
        if name.trim().is_empty() || name.len() > 200 {
            return Err(Error::Validation(
                "Organization name must be 1-200 characters".to_string(),
            ));
        }
        Ok(Organization {
            id: Uuid::new_v4(),
            name,
            kind,
            active: true,
            created_at: Utc::now(),
        })
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub preferred_language: String,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user. Email is lowercased so lookups are
    /// case-insensitive by construction.
    pub fn new(
        email: String,
        role: Role,
        first_name: String,
        last_name: String,
        password_hash: String,
        preferred_language: String,
    ) -> Result<Self> {
        if !email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(Error::MissingRequiredFields("first_name, last_name".to_string()));
        }
        if first_name.len() > 100 || last_name.len() > 100 {
            return Err(Error::Validation(
                "Names must be at most 100 characters".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(User {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            role,
            first_name: Some(first_name),
            last_name: Some(last_name),
            password_hash,
            preferred_language,
            deactivated_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

/// Membership - association between User and Organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub full_access: bool,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(organization_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Membership {
            id: Uuid::new_v4(),
            organization_id,
            user_id,
            role,
            full_access: false,
            created_at: Utc::now(),
        }
    }
}

/// Association between User and Residence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserResidence {
    pub id: Uuid,
    pub user_id: Uuid,
    pub residence_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl UserResidence {
    pub fn new(user_id: Uuid, residence_id: Uuid) -> Self {
        UserResidence {
            id: Uuid::new_v4(),
            user_id,
            residence_id,
            created_at: Utc::now(),
        }
    }
}

/// One membership as the authorization layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorMembership {
    pub organization_id: Uuid,
    pub kind: OrganizationKind,
    pub role: Role,
    pub full_access: bool,
}

/// The acting user, reduced to what authorization decisions need.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub memberships: Vec<ActorMembership>,
    pub residence_ids: Vec<Uuid>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_full_access(&self) -> bool {
        self.is_admin() || self.memberships.iter().any(|m| m.full_access)
    }

    pub fn belongs_to(&self, organization_id: Uuid) -> bool {
        self.memberships
            .iter()
            .any(|m| m.organization_id == organization_id)
    }

    pub fn organization_ids(&self) -> Vec<Uuid> {
        self.memberships.iter().map(|m| m.organization_id).collect()
    }
}

impl From<&AuthContext> for Actor {
    fn from(ctx: &AuthContext) -> Self {
        Actor {
            user_id: ctx.user.id,
            role: ctx.user.role.into(),
            memberships: ctx
                .memberships
                .iter()
                .map(|m| ActorMembership {
                    organization_id: m.organization_id,
                    kind: m.organization_kind.into(),
                    role: m.role.into(),
                    full_access: m.full_access,
                })
                .collect(),
            residence_ids: ctx.residence_ids.clone(),
        }
    }
}

/// Invitation entity - a pending offer to join an organization
///
/// The raw token is retained only so resend can rebuild the accept link;
/// every lookup and verification goes through `token_hash`. State is
/// derived: cancellation deletes the row, so a loaded invitation is
/// pending, accepted, or expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub residence_id: Option<Uuid>,
    pub invited_by: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub personal_message: Option<String>,
    pub language: String,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        organization_id: Uuid,
        residence_id: Option<Uuid>,
        invited_by: Uuid,
        email: String,
        role: Role,
        personal_message: Option<String>,
        language: String,
        expires_at: DateTime<Utc>,
    ) -> Result<Self> {
        if !email.validate_email() {
            return Err(Error::Validation("Invalid email format".to_string()));
        }
        if let Some(ref message) = personal_message {
            if message.len() > MAX_PERSONAL_MESSAGE_LEN {
                return Err(Error::Validation(format!(
                    "Personal message must be at most {} characters",
                    MAX_PERSONAL_MESSAGE_LEN
                )));
            }
        }

        let issued = TokenIssuer::issue()?;
        let now = Utc::now();
        Ok(Invitation {
            id: Uuid::new_v4(),
            organization_id,
            residence_id,
            invited_by,
            email: email.to_lowercase(),
            role,
            token: issued.token,
            token_hash: issued.hash,
            personal_message,
            language,
            expires_at,
            accepted_at: None,
            accepted_by: None,
            created_at: now,
        })
    }

    /// Current derived state.
    pub fn state(&self) -> InvitationState {
        if self.accepted_at.is_some() {
            InvitationState::Accepted
        } else if self.expires_at < Utc::now() {
            InvitationState::Expired
        } else {
            InvitationState::Pending
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Accept the invitation on behalf of a newly created user.
    pub fn accept(&mut self, accepted_by: Uuid) -> Result<()> {
        self.apply_transition(InvitationEvent::Accept)?;
        self.accepted_at = Some(Utc::now());
        self.accepted_by = Some(accepted_by);
        Ok(())
    }

    /// Resend: extend the expiry window from now; the token is unchanged.
    pub fn extend_expiry(&mut self, expiry_days: i64) -> Result<()> {
        self.apply_transition(InvitationEvent::Resend)?;
        self.expires_at = Utc::now() + chrono::Duration::days(expiry_days);
        Ok(())
    }

    fn apply_transition(&self, event: InvitationEvent) -> Result<InvitationState> {
        let context = InvitationGuardContext {
            is_expired: self.is_expired(),
        };
        InvitationStateMachine::transition(self.state(), event, Some(&context)).map_err(|e| {
            match (self.state(), &e) {
                (InvitationState::Accepted, _) => Error::InvitationAlreadyUsed,
                (InvitationState::Expired, _) => Error::InvitationExpired,
                (_, StateError::GuardFailed(_)) => Error::InvitationExpired,
                _ => Error::Validation(e.to_string()),
            }
        })
    }
}

/// Append-only audit record for sensitive invitation actions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub invitation_id: Option<Uuid>,
    pub action: String,
    pub actor_id: Option<Uuid>,
    pub ip_address: String,
    pub user_agent: String,
    pub previous_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> Invitation {
        Invitation::new(
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            "Future.Resident@Example.com".to_string(),
            Role::Resident,
            None,
            "fr".to_string(),
            Utc::now() + chrono::Duration::days(7),
        )
        .unwrap()
    }

    #[test]
    fn invitation_creation_lowercases_email() {
        let inv = invitation();
        assert_eq!(inv.email, "future.resident@example.com");
        assert_eq!(inv.state(), InvitationState::Pending);
        assert_eq!(inv.token.len(), 43);
        assert_eq!(inv.token_hash.len(), 64);
        assert!(inv.expires_at > Utc::now());
    }

    #[test]
    fn invitation_rejects_invalid_email() {
        let result = Invitation::new(
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            "not-an-email".to_string(),
            Role::Resident,
            None,
            "fr".to_string(),
            Utc::now() + chrono::Duration::days(7),
        );
        assert!(result.is_err());
    }

    #[test]
    fn invitation_personal_message_length_boundary() {
        let make = |len: usize| {
            Invitation::new(
                Uuid::new_v4(),
                None,
                Uuid::new_v4(),
                "a@example.com".to_string(),
                Role::Tenant,
                Some("m".repeat(len)),
                "fr".to_string(),
                Utc::now() + chrono::Duration::days(7),
            )
        };
        assert!(make(MAX_PERSONAL_MESSAGE_LEN).is_ok());
        assert!(make(MAX_PERSONAL_MESSAGE_LEN + 1).is_err());
    }

    #[test]
    fn invitation_accept_sets_timestamps() {
        let mut inv = invitation();
        let new_user = Uuid::new_v4();
        inv.accept(new_user).unwrap();
        assert_eq!(inv.state(), InvitationState::Accepted);
        assert!(inv.accepted_at.is_some());
        assert_eq!(inv.accepted_by, Some(new_user));
    }

    #[test]
    fn invitation_cannot_accept_twice() {
        let mut inv = invitation();
        inv.accept(Uuid::new_v4()).unwrap();
        let result = inv.accept(Uuid::new_v4());
        assert!(matches!(result, Err(Error::InvitationAlreadyUsed)));
    }

    #[test]
    fn invitation_expired_state_boundary() {
        let mut inv = invitation();
        inv.expires_at = Utc::now() - chrono::Duration::seconds(10);
        assert_eq!(inv.state(), InvitationState::Expired);
        assert!(inv.is_expired());

        inv.expires_at = Utc::now() + chrono::Duration::days(7);
        assert_eq!(inv.state(), InvitationState::Pending);
        assert!(!inv.is_expired());
    }

    #[test]
    fn expired_invitation_cannot_be_accepted() {
        let mut inv = invitation();
        inv.expires_at = Utc::now() - chrono::Duration::seconds(10);
        let result = inv.accept(Uuid::new_v4());
        assert!(matches!(result, Err(Error::InvitationExpired)));
    }

    #[test]
    fn resend_extends_expiry_and_keeps_token() {
        let mut inv = invitation();
        let original_token = inv.token.clone();
        let original_hash = inv.token_hash.clone();
        let original_expiry = inv.expires_at;

        // Simulate a few days passing by shrinking the window
        inv.expires_at = Utc::now() + chrono::Duration::days(2);
        inv.extend_expiry(7).unwrap();

        assert_eq!(inv.token, original_token);
        assert_eq!(inv.token_hash, original_hash);
        assert!(inv.expires_at > Utc::now() + chrono::Duration::days(6));
        assert!(inv.expires_at >= original_expiry);
        assert_eq!(inv.state(), InvitationState::Pending);
    }

    #[test]
    fn resend_rejected_for_expired_invitation() {
        let mut inv = invitation();
        inv.expires_at = Utc::now() - chrono::Duration::seconds(10);
        assert!(matches!(inv.extend_expiry(7), Err(Error::InvitationExpired)));
    }

    #[test]
    fn resend_rejected_for_accepted_invitation() {
        let mut inv = invitation();
        inv.accept(Uuid::new_v4()).unwrap();
        assert!(matches!(
            inv.extend_expiry(7),
            Err(Error::InvitationAlreadyUsed)
        ));
    }

    #[test]
    fn user_creation_lowercases_and_requires_names() {
        let user = User::new(
            "Marie.Tremblay@Example.com".to_string(),
            Role::Manager,
            "Marie".to_string(),
            "Tremblay".to_string(),
            "salt:hash".to_string(),
            "fr".to_string(),
        )
        .unwrap();
        assert_eq!(user.email, "marie.tremblay@example.com");
        assert_eq!(user.display_name(), "Marie Tremblay");
        assert!(user.is_active());

        let missing = User::new(
            "a@example.com".to_string(),
            Role::Resident,
            "".to_string(),
            "Tremblay".to_string(),
            "salt:hash".to_string(),
            "fr".to_string(),
        );
        assert!(matches!(missing, Err(Error::MissingRequiredFields(_))));
    }

    #[test]
    fn actor_full_access_and_membership() {
        let org = Uuid::new_v4();
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Manager,
            memberships: vec![ActorMembership {
                organization_id: org,
                kind: OrganizationKind::Standard,
                role: Role::Manager,
                full_access: false,
            }],
            residence_ids: vec![],
        };
        assert!(!actor.has_full_access());
        assert!(actor.belongs_to(org));
        assert!(!actor.belongs_to(Uuid::new_v4()));

        let admin = Actor {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
            memberships: vec![],
            residence_ids: vec![],
        };
        assert!(admin.has_full_access());
    }

    #[test]
    fn organization_name_validation() {
        assert!(Organization::new("Syndicat Le Plateau".to_string(), OrganizationKind::Standard).is_ok());
        assert!(Organization::new("".to_string(), OrganizationKind::Standard).is_err());
        assert!(Organization::new("   ".to_string(), OrganizationKind::Standard).is_err());
        assert!(Organization::new("a".repeat(201), OrganizationKind::Standard).is_err());
    }

    #[test]
    fn invitation_serialization_hides_token_fields() {
        let inv = invitation();
        let json = serde_json::to_value(&inv).unwrap();
        assert!(json.get("token").is_none());
        assert!(json.get("token_hash").is_none());
        assert!(json.get("email").is_some());
    }
}
