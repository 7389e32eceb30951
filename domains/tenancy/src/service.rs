//! Invitation service orchestration
//!
//! Every operation runs the same guard chain order: role table, partition
//! rules, existence checks, then organization scope. Email delivery is
//! collapsed to a boolean so a failed send degrades the response instead of
//! failing it, and every sensitive action lands on the audit trail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use uuid::Uuid;

use habitek_common::{hash_password, Config, Error, Pagination, RepositoryError, Result};
use habitek_email::{
    content::{self, Language, ReminderEmailParams},
    EmailService, InvitationEmailParams,
};

use crate::audit::{AuditEvent, AuditTrail, RequestMetadata};
use crate::domain::entities::{Actor, Invitation, Membership, User, UserResidence};
use crate::domain::roles::{can_assign, Role};
use crate::domain::scope::{has_scope, OrgScopeTarget};
use crate::domain::state::InvitationState;
use crate::domain::token::TokenIssuer;
use crate::domain::validation::{
    normalize_email, normalize_language, resolve_expiry, validate_password,
};
use crate::domain::OrganizationKind;
use crate::repository::{
    create_invitation_tx, create_membership_tx, create_user_residence_tx, create_user_tx,
    delete_pending_invitations_tx, mark_invitation_accepted_tx, TenancyRepositories,
};

/// Invitation-engine settings carved out of the application config.
#[derive(Debug, Clone)]
pub struct InvitationSettings {
    pub app_base_url: String,
    pub unsubscribe_secret: String,
    pub invitation_expiry_days: i64,
    pub reminder_min_age_hours: i64,
}

impl InvitationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_base_url: config.app_base_url.clone(),
            unsubscribe_secret: config.unsubscribe_secret.clone(),
            invitation_expiry_days: config.invitation_expiry_days,
            reminder_min_age_hours: config.reminder_min_age_hours,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: Role,
    pub organization_id: Uuid,
    pub residence_id: Option<Uuid>,
    pub personal_message: Option<String>,
    pub language: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreateInvitationOutcome {
    pub invitation_id: Uuid,
    pub email_sent: bool,
}

/// What a recipient sees when validating their token, before registering.
#[derive(Debug, Serialize)]
pub struct InvitationSummary {
    pub organization_name: String,
    pub email: String,
    pub role: Role,
    pub inviter_name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub preferred_language: Option<String>,
    pub data_collection_consent: bool,
    pub acknowledged_rights: bool,
}

#[derive(Debug, Serialize)]
pub struct AcceptedUserSummary {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub organization_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReminderSweepOutcome {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct InvitationService {
    repos: TenancyRepositories,
    email: Arc<dyn EmailService>,
    audit: AuditTrail,
    settings: InvitationSettings,
}

impl InvitationService {
    pub fn new(
        repos: TenancyRepositories,
        email: Arc<dyn EmailService>,
        audit: AuditTrail,
        settings: InvitationSettings,
    ) -> Self {
        Self {
            repos,
            email,
            audit,
            settings,
        }
    }

    /// Create an invitation. Supersedes any pending invitation for the same
    /// (organization, email) atomically with the insert.
    pub async fn create_invitation(
        &self,
        actor: &Actor,
        request: CreateInvitationRequest,
        meta: RequestMetadata,
    ) -> Result<CreateInvitationOutcome> {
        can_assign(actor.role, request.role)?;
        let email = normalize_email(&request.email)?;

        let organization = self
            .repos
            .organizations
            .get_by_id(request.organization_id)
            .await?
            .ok_or_else(|| Error::NotFound("Organization not found".to_string()))?;

        // Demo roles live only in demo organizations, and vice versa
        if request.role.is_demo() && organization.kind != OrganizationKind::Demo {
            return Err(Error::InvalidDemoRoleAssignment);
        }
        if !request.role.is_demo() && organization.kind == OrganizationKind::Demo {
            return Err(Error::InvalidRoleAssignment);
        }

        if self.repos.users.exists_by_email(&email).await? {
            return Err(Error::UserExists);
        }

        if let Some(residence_id) = request.residence_id {
            let resolved = self
                .repos
                .organizations
                .resolve_residence(residence_id)
                .await?
                .ok_or_else(|| Error::NotFound("Residence not found".to_string()))?;
            if resolved.organization_id != organization.id {
                return Err(Error::Validation(
                    "Residence does not belong to the target organization".to_string(),
                ));
            }
        }

        has_scope(
            actor,
            &[OrgScopeTarget {
                organization_id: organization.id,
                kind: organization.kind,
            }],
        )?;

        let language = normalize_language(request.language.as_deref());
        let expires_at = resolve_expiry(
            request.expires_at,
            self.settings.invitation_expiry_days,
        )?;
        let invitation = Invitation::new(
            organization.id,
            request.residence_id,
            actor.user_id,
            email,
            request.role,
            request.personal_message,
            language,
            expires_at,
        )?;

        let mut tx = self.repos.begin().await?;
        let superseded =
            delete_pending_invitations_tx(&mut tx, organization.id, &invitation.email).await?;
        create_invitation_tx(&mut tx, &invitation).await?;
        tx.commit().await?;

        if superseded > 0 {
            tracing::info!(
                organization_id = %organization.id,
                superseded,
                "superseded pending invitation(s) for the same recipient"
            );
        }

        let inviter_name = self.inviter_display_name(actor.user_id).await;
        let email_sent = self
            .send_invitation_email(&invitation, &organization.name, &inviter_name)
            .await;

        self.audit.record(
            AuditEvent::new("invitation_created", meta)
                .invitation(invitation.id)
                .actor(actor.user_id)
                .new_value(serde_json::json!({
                    "email": invitation.email,
                    "role": invitation.role,
                    "organization_id": invitation.organization_id,
                    "email_sent": email_sent,
                })),
        );

        Ok(CreateInvitationOutcome {
            invitation_id: invitation.id,
            email_sent,
        })
    }

    /// Public token validation: hash-keyed lookup, constant-time verify,
    /// then lifecycle guards.
    pub async fn validate_token(&self, token: &str) -> Result<InvitationSummary> {
        let invitation = self.load_valid_invitation(token).await?;

        let organization = self
            .repos
            .organizations
            .get_by_id(invitation.organization_id)
            .await?
            .ok_or_else(|| Error::NotFound("Organization not found".to_string()))?;
        let inviter_name = self.inviter_display_name(invitation.invited_by).await;

        Ok(InvitationSummary {
            organization_name: organization.name,
            email: invitation.email,
            role: invitation.role,
            inviter_name,
            expires_at: invitation.expires_at,
        })
    }

    /// Accept an invitation: create the user, membership, and residence
    /// link, and mark the invitation used, all in one transaction.
    pub async fn accept_invitation(
        &self,
        token: &str,
        registration: RegistrationRequest,
        meta: RequestMetadata,
    ) -> Result<AcceptedUserSummary> {
        let invitation = self.load_valid_invitation(token).await?;

        if registration.first_name.trim().is_empty() || registration.last_name.trim().is_empty() {
            return Err(Error::MissingRequiredFields(
                "first_name, last_name".to_string(),
            ));
        }
        validate_password(&registration.password)?;
        if !registration.data_collection_consent || !registration.acknowledged_rights {
            return Err(Error::MissingRequiredConsents);
        }

        if self.repos.users.exists_by_email(&invitation.email).await? {
            return Err(Error::UserExists);
        }

        let language = match registration.preferred_language.as_deref() {
            Some(tag) => normalize_language(Some(tag)),
            None => invitation.language.clone(),
        };
        let password_hash = hash_password(&registration.password);
        let user = User::new(
            invitation.email.clone(),
            invitation.role,
            registration.first_name,
            registration.last_name,
            password_hash,
            language,
        )?;
        let membership = Membership::new(invitation.organization_id, user.id, invitation.role);

        let mut tx = self.repos.begin().await?;
        create_user_tx(&mut tx, &user).await?;
        mark_invitation_accepted_tx(&mut tx, invitation.id, user.id)
            .await
            .map_err(accept_race_error)?;
        create_membership_tx(&mut tx, &membership).await?;
        if let Some(residence_id) = invitation.residence_id {
            create_user_residence_tx(&mut tx, &UserResidence::new(user.id, residence_id)).await?;
        }
        tx.commit().await?;

        self.audit.record(
            AuditEvent::new("invitation_accepted", meta)
                .invitation(invitation.id)
                .actor(user.id)
                .new_value(serde_json::json!({
                    "user_id": user.id,
                    "organization_id": invitation.organization_id,
                    "role": invitation.role,
                })),
        );

        Ok(AcceptedUserSummary {
            user_id: user.id,
            email: user.email,
            role: invitation.role,
            organization_id: invitation.organization_id,
        })
    }

    /// Re-send a pending invitation, extending its validity window from
    /// now. The token does not change.
    pub async fn resend_invitation(
        &self,
        actor: &Actor,
        invitation_id: Uuid,
        meta: RequestMetadata,
    ) -> Result<bool> {
        let mut invitation = self
            .repos
            .invitations
            .get_by_id(invitation_id)
            .await?
            .ok_or(Error::InvitationNotFound)?;

        if !actor.is_admin() && invitation.invited_by != actor.user_id {
            return Err(Error::InsufficientPermissions);
        }

        // Entity transition check, then the repository write that realizes it
        invitation.extend_expiry(self.settings.invitation_expiry_days)?;
        let invitation = self
            .repos
            .invitations
            .extend_expiration(invitation_id, self.settings.invitation_expiry_days as i32)
            .await?;

        let organization = self
            .repos
            .organizations
            .get_by_id(invitation.organization_id)
            .await?
            .ok_or_else(|| Error::NotFound("Organization not found".to_string()))?;
        let email_sent = self
            .send_reminder_email(&invitation, &organization.name)
            .await;

        self.audit.record(
            AuditEvent::new("reminder_sent", meta)
                .invitation(invitation.id)
                .actor(actor.user_id)
                .metadata(serde_json::json!({ "email_sent": email_sent })),
        );

        Ok(email_sent)
    }

    /// Cancel (withdraw) a pending invitation. The row is deleted; history
    /// lives on the audit trail.
    pub async fn cancel_invitation(
        &self,
        actor: &Actor,
        invitation_id: Uuid,
        meta: RequestMetadata,
    ) -> Result<()> {
        let invitation = self
            .repos
            .invitations
            .get_by_id(invitation_id)
            .await?
            .ok_or(Error::InvitationNotFound)?;

        if !actor.is_admin() {
            if !matches!(actor.role, Role::Manager | Role::DemoManager) {
                return Err(Error::InsufficientPermissions);
            }
            let organization = self
                .repos
                .organizations
                .get_by_id(invitation.organization_id)
                .await?
                .ok_or_else(|| Error::NotFound("Organization not found".to_string()))?;
            has_scope(
                actor,
                &[OrgScopeTarget {
                    organization_id: organization.id,
                    kind: organization.kind,
                }],
            )?;
        }

        ensure_cancellable(&invitation)?;

        self.repos.invitations.delete(invitation_id).await?;

        self.audit.record(
            AuditEvent::new("invitation_cancelled", meta)
                .invitation(invitation_id)
                .actor(actor.user_id)
                .new_value(serde_json::json!({
                    "email": invitation.email,
                    "organization_id": invitation.organization_id,
                })),
        );

        Ok(())
    }

    /// List invitations the actor may see.
    pub async fn list_invitations(
        &self,
        actor: &Actor,
        pending_only: bool,
        pagination: Pagination,
    ) -> Result<Vec<Invitation>> {
        let (limit, offset) = (pagination.limit(), pagination.offset());
        if actor.is_admin() {
            self.repos
                .invitations
                .find_all(pending_only, limit, offset)
                .await
        } else {
            self.repos
                .invitations
                .find_visible_to(
                    actor.user_id,
                    &actor.organization_ids(),
                    pending_only,
                    limit,
                    offset,
                )
                .await
        }
    }

    /// Bulk reminder sweep over pending invitations older than the
    /// configured minimum age. Per-invitation failures are isolated.
    pub async fn send_pending_reminders(
        &self,
        actor: &Actor,
        meta: RequestMetadata,
    ) -> Result<ReminderSweepOutcome> {
        if !actor.is_admin() {
            return Err(Error::InsufficientPermissions);
        }

        let due = self
            .repos
            .invitations
            .find_pending_for_reminder(self.settings.reminder_min_age_hours as i32)
            .await?;

        let expiry_days = self.settings.invitation_expiry_days;
        let mut tasks: JoinSet<bool> = JoinSet::new();
        for mut invitation in due {
            let service = self.clone();
            tasks.spawn(async move {
                let name = match service
                    .repos
                    .organizations
                    .get_by_id(invitation.organization_id)
                    .await
                {
                    Ok(Some(org)) => org.name,
                    _ => return false,
                };
                // A reminder is a resend: the validity window moves with it.
                match service
                    .repos
                    .invitations
                    .extend_expiration(invitation.id, expiry_days as i32)
                    .await
                {
                    Ok(updated) => invitation.expires_at = updated.expires_at,
                    Err(e) => {
                        tracing::warn!(
                            invitation_id = %invitation.id,
                            error = %e,
                            "failed to extend invitation expiry during reminder sweep"
                        );
                        return false;
                    }
                }
                service.send_reminder_email(&invitation, &name).await
            });
        }

        let mut sent = 0;
        let mut failed = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(true) => sent += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "reminder task panicked");
                    failed += 1;
                }
            }
        }

        self.audit.record(
            AuditEvent::new("bulk_reminder_sent", meta)
                .actor(actor.user_id)
                .metadata(serde_json::json!({ "sent": sent, "failed": failed })),
        );

        Ok(ReminderSweepOutcome { sent, failed })
    }

    async fn load_valid_invitation(&self, token: &str) -> Result<Invitation> {
        let hash = TokenIssuer::lookup_hash(token);
        let invitation = self
            .repos
            .invitations
            .get_by_token_hash(&hash)
            .await?
            .ok_or(Error::InvitationNotFound)?;

        if !TokenIssuer::verify(token, &invitation.token_hash) {
            return Err(Error::InvitationNotFound);
        }

        match invitation.state() {
            InvitationState::Accepted => Err(Error::InvitationAlreadyUsed),
            InvitationState::Expired => Err(Error::InvitationExpired),
            _ => Ok(invitation),
        }
    }

    async fn inviter_display_name(&self, user_id: Uuid) -> String {
        match self.repos.users.get_by_id(user_id).await {
            Ok(Some(user)) => user.display_name(),
            _ => "Habitek".to_string(),
        }
    }

    fn accept_url(&self, token: &str) -> String {
        format!("{}/invitations/accept/{}", self.settings.app_base_url, token)
    }

    async fn send_invitation_email(
        &self,
        invitation: &Invitation,
        organization_name: &str,
        inviter_name: &str,
    ) -> bool {
        let language = Language::from_tag(&invitation.language);
        let body = content::invitation_email(&InvitationEmailParams {
            organization_name: organization_name.to_string(),
            inviter_name: inviter_name.to_string(),
            role_label: invitation
                .role
                .label(language == Language::French)
                .to_string(),
            accept_url: self.accept_url(&invitation.token),
            expires_at: invitation.expires_at,
            personal_message: invitation.personal_message.clone(),
            language,
        });
        match self
            .email
            .send_email(&invitation.email, &body.subject, &body)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    invitation_id = %invitation.id,
                    error = %e,
                    "invitation email delivery failed"
                );
                false
            }
        }
    }

    async fn send_reminder_email(&self, invitation: &Invitation, organization_name: &str) -> bool {
        let language = Language::from_tag(&invitation.language);
        let unsubscribe = TokenIssuer::unsubscribe_token(
            &invitation.email,
            &self.settings.unsubscribe_secret,
        );
        let body = content::reminder_email(&ReminderEmailParams {
            organization_name: organization_name.to_string(),
            accept_url: self.accept_url(&invitation.token),
            unsubscribe_url: format!("{}/unsubscribe/{}", self.settings.app_base_url, unsubscribe),
            expires_at: invitation.expires_at,
            language,
        });
        match self
            .email
            .send_email(&invitation.email, &body.subject, &body)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    invitation_id = %invitation.id,
                    error = %e,
                    "reminder email delivery failed"
                );
                false
            }
        }
    }
}

/// Accepted invitations are the registration record and stay; pending and
/// expired rows may be deleted.
fn ensure_cancellable(invitation: &Invitation) -> Result<()> {
    if invitation.state() == InvitationState::Accepted {
        return Err(Error::InvitationAlreadyUsed);
    }
    Ok(())
}

/// Acceptance races on the conditional UPDATE: the loser sees no matching
/// row and gets the conflict answer. Anything else is a real failure and
/// surfaces as such.
fn accept_race_error(e: RepositoryError) -> Error {
    match e {
        RepositoryError::NotFound => Error::InvitationAlreadyUsed,
        other => Error::from(other),
    }
}
