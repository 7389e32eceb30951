//! Invitation lifecycle tests
//!
//! Exercises the full invitation flow without a database: authorization
//! checks, token issue and verification, email capture through the mock
//! service, token extraction from the accept link, and the accept and
//! expiry transitions on the invitation entity.

use chrono::{Duration, Utc};
use uuid::Uuid;

use habitek_common::Error;
use habitek_email::content::{invitation_email, InvitationEmailParams, Language};
use habitek_email::{EmailService, MockEmailService};
use habitek_tenancy::domain::entities::{Actor, ActorMembership, Invitation, OrganizationKind};
use habitek_tenancy::domain::roles::{can_assign, Role};
use habitek_tenancy::domain::scope::{has_scope, OrgScopeTarget};
use habitek_tenancy::domain::state::InvitationState;
use habitek_tenancy::domain::token::TokenIssuer;

fn manager_actor(org_id: Uuid) -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        role: Role::Manager,
        memberships: vec![ActorMembership {
            organization_id: org_id,
            kind: OrganizationKind::Standard,
            role: Role::Manager,
            full_access: false,
        }],
        residence_ids: vec![],
    }
}

fn new_invitation(org_id: Uuid, invited_by: Uuid, email: &str) -> Invitation {
    Invitation::new(
        org_id,
        None,
        invited_by,
        email.to_string(),
        Role::Tenant,
        Some("Bienvenue dans l'immeuble".to_string()),
        "fr".to_string(),
        Utc::now() + Duration::days(7),
    )
    .unwrap()
}

#[tokio::test]
async fn complete_invitation_workflow_with_email_capture() {
    let org_id = Uuid::new_v4();
    let manager = manager_actor(org_id);

    // Manager is allowed to invite a tenant into their own organization.
    can_assign(manager.role, Role::Tenant).unwrap();
    has_scope(
        &manager,
        &[OrgScopeTarget {
            organization_id: org_id,
            kind: OrganizationKind::Standard,
        }],
    )
    .unwrap();

    let invitation = new_invitation(org_id, manager.user_id, "Nouveau.Locataire@example.com");
    assert_eq!(invitation.email, "nouveau.locataire@example.com");
    assert_eq!(invitation.state(), InvitationState::Pending);
    assert_eq!(invitation.token.len(), 43);
    assert_eq!(
        invitation.token_hash,
        TokenIssuer::lookup_hash(&invitation.token)
    );

    // Send the invitation email through the mock and capture it.
    let email_service = MockEmailService::new("invitations@habitek.ca".to_string());
    let accept_url = format!(
        "https://app.habitek.ca/invitations/accept/{}",
        invitation.token
    );
    let body = invitation_email(&InvitationEmailParams {
        organization_name: "Coopérative Le Plateau".to_string(),
        inviter_name: "Marie Tremblay".to_string(),
        role_label: Role::Tenant.label(true).to_string(),
        accept_url,
        expires_at: invitation.expires_at,
        personal_message: invitation.personal_message.clone(),
        language: Language::French,
    });
    email_service
        .send_email(&invitation.email, &body.subject, &body)
        .await
        .unwrap();

    assert_eq!(email_service.sent_count(), 1);
    let captured = email_service.last_email().unwrap();
    assert_eq!(captured.to, "nouveau.locataire@example.com");

    // The invitee follows the link: the token in the email must resolve
    // back to the stored hash.
    let presented = captured.invitation_token().unwrap();
    assert_eq!(presented, invitation.token);
    assert!(TokenIssuer::verify(&presented, &invitation.token_hash));
    assert!(!TokenIssuer::verify("forged-token", &invitation.token_hash));

    // Accepting flips the invitation to its terminal state, exactly once.
    let mut invitation = invitation;
    let new_user_id = Uuid::new_v4();
    invitation.accept(new_user_id).unwrap();
    assert_eq!(invitation.state(), InvitationState::Accepted);
    assert_eq!(invitation.accepted_by, Some(new_user_id));

    let err = invitation.accept(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, Error::InvitationAlreadyUsed));
}

#[tokio::test]
async fn expired_invitation_cannot_be_accepted() {
    let org_id = Uuid::new_v4();
    let mut invitation = new_invitation(org_id, Uuid::new_v4(), "late@example.com");
    invitation.expires_at = Utc::now() - Duration::hours(1);

    assert_eq!(invitation.state(), InvitationState::Expired);
    let err = invitation.accept(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, Error::InvitationExpired));
}

#[tokio::test]
async fn resend_extends_expiry_and_keeps_token() {
    let org_id = Uuid::new_v4();
    let mut invitation = new_invitation(org_id, Uuid::new_v4(), "resend@example.com");
    let original_token = invitation.token.clone();
    let original_expiry = invitation.expires_at;

    invitation.extend_expiry(7).unwrap();
    assert!(invitation.expires_at > original_expiry);
    assert_eq!(invitation.token, original_token);

    // A resent invitation link still verifies against the stored hash.
    assert!(TokenIssuer::verify(
        &invitation.token,
        &invitation.token_hash
    ));
}

#[tokio::test]
async fn email_failure_is_reported_by_mock() {
    let email_service = MockEmailService::new("invitations@habitek.ca".to_string());
    email_service.set_fail_sends(true);

    let body = invitation_email(&InvitationEmailParams {
        organization_name: "OSBL Hochelaga".to_string(),
        inviter_name: "Jean Roy".to_string(),
        role_label: Role::Resident.label(true).to_string(),
        accept_url: "https://app.habitek.ca/invitations/accept/abc".to_string(),
        expires_at: Utc::now() + Duration::days(7),
        personal_message: None,
        language: Language::French,
    });
    let result = email_service
        .send_email("someone@example.com", &body.subject, &body)
        .await;

    assert!(result.is_err());
    assert_eq!(email_service.sent_count(), 0);
}

#[test]
fn manager_cannot_escalate_or_cross_organizations() {
    let org_id = Uuid::new_v4();
    let other_org = Uuid::new_v4();
    let manager = manager_actor(org_id);

    assert!(matches!(
        can_assign(manager.role, Role::Admin),
        Err(Error::RoleEscalationDenied)
    ));
    assert!(matches!(
        has_scope(
            &manager,
            &[OrgScopeTarget {
                organization_id: other_org,
                kind: OrganizationKind::Standard,
            }],
        ),
        Err(Error::OrganizationScopeViolation)
    ));
}

#[test]
fn demo_manager_is_confined_to_demo_organizations() {
    let demo_org = Uuid::new_v4();
    let actor = Actor {
        user_id: Uuid::new_v4(),
        role: Role::DemoManager,
        memberships: vec![ActorMembership {
            organization_id: demo_org,
            kind: OrganizationKind::Demo,
            role: Role::DemoManager,
            full_access: true,
        }],
        residence_ids: vec![],
    };

    can_assign(actor.role, Role::DemoTenant).unwrap();
    assert!(matches!(
        can_assign(actor.role, Role::Tenant),
        Err(Error::InvalidDemoRoleAssignment)
    ));

    // full_access does not lift the demo partition rule.
    assert!(matches!(
        has_scope(
            &actor,
            &[OrgScopeTarget {
                organization_id: Uuid::new_v4(),
                kind: OrganizationKind::Standard,
            }],
        ),
        Err(Error::DemoScopeViolation)
    ));
}

#[test]
fn unsubscribe_token_round_trip() {
    let token = TokenIssuer::unsubscribe_token("Locataire@Example.com", "secret");
    assert!(TokenIssuer::verify_unsubscribe_token(
        &token,
        "locataire@example.com",
        "secret"
    ));
    assert!(!TokenIssuer::verify_unsubscribe_token(
        &token,
        "locataire@example.com",
        "other-secret"
    ));
}
