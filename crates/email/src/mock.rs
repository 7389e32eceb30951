use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use regex::Regex;

use crate::content::EmailBody;
use crate::{EmailError, EmailService};

/// An email captured by the mock instead of being delivered.
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl CapturedEmail {
    /// Pulls the invitation token out of the acceptance link, the way a
    /// recipient clicking the link would.
    pub fn invitation_token(&self) -> Option<String> {
        let re = Regex::new(r"/invitations/accept/([A-Za-z0-9_-]+)").ok()?;
        re.captures(&self.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Captures outbound mail for assertions. Can be told to fail to exercise
/// partial-success paths.
#[derive(Clone)]
pub struct MockEmailService {
    from_address: String,
    sent: Arc<Mutex<Vec<CapturedEmail>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl MockEmailService {
    pub fn new(from_address: String) -> Self {
        Self {
            from_address,
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: Arc::new(Mutex::new(false)),
        }
    }

    pub fn sent_emails(&self) -> Vec<CapturedEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_email(&self) -> Option<CapturedEmail> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().unwrap() = fail;
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError> {
        if *self.fail_sends.lock().unwrap() {
            return Err(EmailError::SendFailed("mock failure".to_string()));
        }
        self.sent.lock().unwrap().push(CapturedEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: body.text.clone(),
            html: body.html.clone(),
        });
        Ok(())
    }

    fn from_address(&self) -> &str {
        &self.from_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> EmailBody {
        EmailBody {
            subject: "s".to_string(),
            text: text.to_string(),
            html: String::new(),
        }
    }

    #[tokio::test]
    async fn captures_sent_emails() {
        let mock = MockEmailService::new("test@habitek.ca".to_string());
        mock.send_email("dest@example.com", "Hello", &body("corps"))
            .await
            .unwrap();
        assert_eq!(mock.sent_count(), 1);
        assert_eq!(mock.last_email().unwrap().to, "dest@example.com");
    }

    #[tokio::test]
    async fn extracts_invitation_token_from_link() {
        let mock = MockEmailService::new("test@habitek.ca".to_string());
        mock.send_email(
            "dest@example.com",
            "Invitation",
            &body("Lien : https://app.habitek.ca/invitations/accept/AbC-123_xyz\nMerci"),
        )
        .await
        .unwrap();
        let token = mock.last_email().unwrap().invitation_token().unwrap();
        assert_eq!(token, "AbC-123_xyz");
    }

    #[tokio::test]
    async fn failure_mode_returns_error() {
        let mock = MockEmailService::new("test@habitek.ca".to_string());
        mock.set_fail_sends(true);
        let result = mock.send_email("dest@example.com", "x", &body("y")).await;
        assert!(result.is_err());
        assert_eq!(mock.sent_count(), 0);
    }
}
