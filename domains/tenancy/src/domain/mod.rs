//! Domain model for the tenancy domain

pub mod entities;
pub mod roles;
pub mod scope;
pub mod state;
pub mod token;
pub mod validation;

pub use entities::{
    Actor, ActorMembership, AuditLogEntry, Invitation, Membership, Organization, OrganizationKind,
    User, UserResidence,
};
pub use roles::{can_assign, Role};
pub use scope::{has_scope, OrgScopeTarget};
pub use state::{InvitationEvent, InvitationState, InvitationStateMachine};
pub use token::{IssuedToken, TokenIssuer};
