//! Common error types and handling for Habitek
//!
//! Every variant carries a stable machine-readable code and maps to one
//! HTTP status. Guard failures in the invitation engine are regular
//! variants here so handlers can return them with `?` and clients can
//! branch on `error.code` without parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Habitek application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Role is not authorized to perform this action")]
    InsufficientPermissions,

    #[error("Managers cannot assign the admin role")]
    RoleEscalationDenied,

    #[error("Role is outside the actor's allowed assignment set")]
    InvalidRoleAssignment,

    #[error("Demo managers can only assign demo roles")]
    InvalidDemoRoleAssignment,

    #[error("Target organization is outside the actor's authority")]
    OrganizationScopeViolation,

    #[error("Demo managers can only act within demo organizations")]
    DemoScopeViolation,

    #[error("A user with this email already exists")]
    UserExists,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Invitation has expired")]
    InvitationExpired,

    #[error("Invitation has already been used")]
    InvitationAlreadyUsed,

    #[error("Missing required fields: {0}")]
    MissingRequiredFields(String),

    #[error("Data-collection consent and acknowledgement of rights are required")]
    MissingRequiredConsents,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::AuthRequired => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions
            | Error::RoleEscalationDenied
            | Error::InvalidRoleAssignment
            | Error::InvalidDemoRoleAssignment
            | Error::OrganizationScopeViolation
            | Error::DemoScopeViolation => StatusCode::FORBIDDEN,
            Error::UserExists | Error::InvitationAlreadyUsed | Error::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Error::InvitationNotFound | Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvitationExpired => StatusCode::GONE,
            Error::MissingRequiredFields(_)
            | Error::MissingRequiredConsents
            | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unexpected(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::AuthRequired => "AUTH_REQUIRED",
            Error::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Error::RoleEscalationDenied => "ROLE_ESCALATION_DENIED",
            Error::InvalidRoleAssignment => "INVALID_ROLE_ASSIGNMENT",
            Error::InvalidDemoRoleAssignment => "INVALID_DEMO_ROLE_ASSIGNMENT",
            Error::OrganizationScopeViolation => "ORGANIZATION_SCOPE_VIOLATION",
            Error::DemoScopeViolation => "DEMO_SCOPE_VIOLATION",
            Error::UserExists => "USER_EXISTS",
            Error::InvitationNotFound => "INVITATION_NOT_FOUND",
            Error::InvitationExpired => "INVITATION_EXPIRED",
            Error::InvitationAlreadyUsed => "INVITATION_ALREADY_USED",
            Error::MissingRequiredFields(_) => "MISSING_REQUIRED_FIELDS",
            Error::MissingRequiredConsents => "MISSING_REQUIRED_CONSENTS",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Log internal errors with full context; clients only see the code
        if matches!(status, StatusCode::INTERNAL_SERVER_ERROR) {
            tracing::error!(error = %self, "Internal server error");
            let body = Json(json!({
                "error": {
                    "code": error_code,
                    "message": "An internal error occurred",
                }
            }));
            return (status, body).into_response();
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
