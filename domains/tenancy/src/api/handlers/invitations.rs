//! Invitation API handlers
//!
//! Thin layer over `InvitationService`: extract the actor and request
//! metadata, hand off, and shape the response. The validate endpoint has
//! its own `{is_valid, code}` error shape so unauthenticated recipients
//! get a stable machine-readable answer.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use habitek_auth::{AdminUser, AuthUser};
use habitek_common::{Pagination, Result, ValidatedJson};

use crate::audit::RequestMetadata;
use crate::domain::entities::{Actor, Invitation};
use crate::domain::roles::Role;
use crate::domain::state::InvitationState;
use crate::service::{CreateInvitationRequest, RegistrationRequest};

use crate::api::middleware::TenancyState;

/// Request body for creating an invitation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationBody {
    #[validate(email)]
    pub email: String,
    pub role: Role,
    pub organization_id: Uuid,
    pub residence_id: Option<Uuid>,
    #[validate(length(max = 500))]
    pub personal_message: Option<String>,
    pub language: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for token validation
#[derive(Debug, Deserialize, Validate)]
pub struct ValidateInvitationBody {
    #[validate(length(min = 1))]
    pub token: String,
}

/// Request body for accepting an invitation
#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInvitationBody {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub password: String,
    pub preferred_language: Option<String>,
    pub data_collection_consent: bool,
    pub acknowledged_rights: bool,
}

/// Response shape for invitation listings
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub residence_id: Option<Uuid>,
    pub email: String,
    pub role: Role,
    pub state: InvitationState,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id,
            organization_id: invitation.organization_id,
            residence_id: invitation.residence_id,
            email: invitation.email.clone(),
            role: invitation.role,
            state: invitation.state(),
            invited_by: invitation.invited_by,
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
        }
    }
}

/// Invite a user into an organization
///
/// **POST /v1/invitations**
pub async fn create_invitation(
    auth: AuthUser,
    State(state): State<TenancyState>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<CreateInvitationBody>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let actor = Actor::from(&auth.0);
    let meta = RequestMetadata::from_headers(&headers);

    let outcome = state
        .service
        .create_invitation(
            &actor,
            CreateInvitationRequest {
                email: body.email,
                role: body.role,
                organization_id: body.organization_id,
                residence_id: body.residence_id,
                personal_message: body.personal_message,
                language: body.language,
                expires_at: body.expires_at,
            },
            meta,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "invitation_id": outcome.invitation_id,
            "email_sent": outcome.email_sent,
        })),
    ))
}

/// Validate an invitation token before registration
///
/// **POST /v1/invitations/validate** (public)
///
/// Success returns the invitation summary; failures keep the domain
/// status code but answer with `{is_valid: false, code}`.
pub async fn validate_invitation(
    State(state): State<TenancyState>,
    ValidatedJson(body): ValidatedJson<ValidateInvitationBody>,
) -> Response {
    match state.service.validate_token(&body.token).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "is_valid": true,
                "invitation": summary,
            })),
        )
            .into_response(),
        Err(e) => (
            e.status_code(),
            Json(json!({
                "is_valid": false,
                "code": e.error_code(),
            })),
        )
            .into_response(),
    }
}

/// Accept an invitation and register the account
///
/// **POST /v1/invitations/accept/{token}** (public)
pub async fn accept_invitation(
    State(state): State<TenancyState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<AcceptInvitationBody>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let meta = RequestMetadata::from_headers(&headers);

    let summary = state
        .service
        .accept_invitation(
            &token,
            RegistrationRequest {
                first_name: body.first_name,
                last_name: body.last_name,
                password: body.password,
                preferred_language: body.preferred_language,
                data_collection_consent: body.data_collection_consent,
                acknowledged_rights: body.acknowledged_rights,
            },
            meta,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user_id": summary.user_id,
            "email": summary.email,
            "role": summary.role,
            "organization_id": summary.organization_id,
        })),
    ))
}

/// Re-send an invitation email, extending its validity
///
/// **POST /v1/invitations/{id}/resend**
pub async fn resend_invitation(
    auth: AuthUser,
    State(state): State<TenancyState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    let actor = Actor::from(&auth.0);
    let meta = RequestMetadata::from_headers(&headers);

    let email_sent = state.service.resend_invitation(&actor, id, meta).await?;
    Ok(Json(json!({ "email_sent": email_sent })))
}

/// Withdraw a pending invitation
///
/// **DELETE /v1/invitations/{id}**
pub async fn cancel_invitation(
    auth: AuthUser,
    State(state): State<TenancyState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let actor = Actor::from(&auth.0);
    let meta = RequestMetadata::from_headers(&headers);

    state.service.cancel_invitation(&actor, id, meta).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List invitations visible to the actor
///
/// **GET /v1/invitations**
pub async fn list_invitations(
    auth: AuthUser,
    State(state): State<TenancyState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<InvitationResponse>>> {
    let actor = Actor::from(&auth.0);
    let invitations = state
        .service
        .list_invitations(&actor, false, pagination)
        .await?;
    Ok(Json(
        invitations.into_iter().map(InvitationResponse::from).collect(),
    ))
}

/// List only pending invitations
///
/// **GET /v1/invitations/pending**
pub async fn list_pending_invitations(
    auth: AuthUser,
    State(state): State<TenancyState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<InvitationResponse>>> {
    let actor = Actor::from(&auth.0);
    let invitations = state
        .service
        .list_invitations(&actor, true, pagination)
        .await?;
    Ok(Json(
        invitations.into_iter().map(InvitationResponse::from).collect(),
    ))
}

/// Trigger the bulk reminder sweep
///
/// **POST /v1/invitations/reminders** (admin)
pub async fn send_reminders(
    admin: AdminUser,
    State(state): State<TenancyState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    let actor = Actor::from(&admin.0);
    let meta = RequestMetadata::from_headers(&headers);

    let outcome = state.service.send_pending_reminders(&actor, meta).await?;
    Ok(Json(json!({
        "sent": outcome.sent,
        "failed": outcome.failed,
    })))
}
