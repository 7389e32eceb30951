use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("user account not found or disabled")]
    UnknownUser,
    #[error("administrator access required")]
    AdminRequired,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken | AuthError::UnknownUser => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "AUTH_REQUIRED",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::UnknownUser => "UNKNOWN_USER",
            AuthError::AdminRequired => "INSUFFICIENT_PERMISSIONS",
            AuthError::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AuthError::Database(err) => {
                tracing::error!(error = %err, "auth backend database error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}
