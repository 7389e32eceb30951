//! Route definitions for the tenancy domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::invitations;
use super::middleware::TenancyState;

/// Create all tenancy domain API routes
pub fn routes() -> Router<TenancyState> {
    Router::new()
        .route(
            "/v1/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route(
            "/v1/invitations/pending",
            get(invitations::list_pending_invitations),
        )
        .route(
            "/v1/invitations/validate",
            post(invitations::validate_invitation),
        )
        .route(
            "/v1/invitations/accept/{token}",
            post(invitations::accept_invitation),
        )
        .route(
            "/v1/invitations/{id}/resend",
            post(invitations::resend_invitation),
        )
        .route(
            "/v1/invitations/{id}",
            delete(invitations::cancel_invitation),
        )
        .route(
            "/v1/invitations/reminders",
            post(invitations::send_reminders),
        )
}
