//! Tenancy domain: organizations, memberships, and the invitation
//! lifecycle for Quebec residential organizations.
//!
//! The invitation flow is the heart of onboarding: a manager invites a
//! future resident or colleague into an organization, the recipient
//! follows an emailed token link, and acceptance creates the account,
//! membership, and residence associations in one transaction. Role and
//! scope rules decide who may invite whom, and every sensitive action is
//! recorded on an asynchronous audit trail.

pub mod api;
pub mod audit;
pub mod domain;
pub mod repository;
pub mod service;

pub use api::{routes, TenancyState};
pub use audit::{AuditEvent, AuditTrail, RequestMetadata};
pub use service::InvitationService;
