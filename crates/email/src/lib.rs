//! Email delivery for Habitek
//!
//! A small trait over outbound mail with an SES implementation for
//! deployment and a capturing mock for tests. Invitation and reminder
//! bodies are rendered by the `content` module in French and English.

pub mod content;

mod aws_ses;
mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use aws_ses::SesEmailService;
pub use content::{invitation_email, reminder_email, EmailBody, InvitationEmailParams, Language};
pub use mock::{CapturedEmail, MockEmailService};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("failed to send email: {0}")]
    SendFailed(String),
    #[error("email configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from_address: String,
    /// When true, the factory returns the capturing mock instead of SES.
    pub use_mock: bool,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, EmailError> {
        let from_address = std::env::var("EMAIL_FROM_ADDRESS")
            .unwrap_or_else(|_| "invitations@habitek.ca".to_string());
        let use_mock = std::env::var("EMAIL_USE_MOCK")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Ok(Self {
            from_address,
            use_mock,
        })
    }
}

/// Outbound mail. Implementations must not panic on delivery failure;
/// callers decide whether a failed send aborts the operation.
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError>;

    fn from_address(&self) -> &str;
}

pub async fn create_email_service(config: &EmailConfig) -> Arc<dyn EmailService> {
    if config.use_mock {
        Arc::new(MockEmailService::new(config.from_address.clone()))
    } else {
        Arc::new(SesEmailService::new(config.from_address.clone()).await)
    }
}
