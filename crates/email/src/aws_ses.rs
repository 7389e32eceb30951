use async_trait::async_trait;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client;

use crate::content::EmailBody;
use crate::{EmailError, EmailService};

/// Sends mail through Amazon SES using the ambient AWS credentials.
pub struct SesEmailService {
    client: Client,
    from_address: String,
}

impl SesEmailService {
    pub async fn new(from_address: String) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
            from_address,
        }
    }

    pub fn with_client(client: Client, from_address: String) -> Self {
        Self {
            client,
            from_address,
        }
    }
}

#[async_trait]
impl EmailService for SesEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &EmailBody,
    ) -> Result<(), EmailError> {
        let destination = Destination::builder().to_addresses(to).build();
        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Config(e.to_string()))?;
        let text_content = Content::builder()
            .data(&body.text)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Config(e.to_string()))?;
        let html_content = Content::builder()
            .data(&body.html)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Config(e.to_string()))?;
        let message = Message::builder()
            .subject(subject_content)
            .body(
                Body::builder()
                    .text(text_content)
                    .html(html_content)
                    .build(),
            )
            .build();

        self.client
            .send_email()
            .source(&self.from_address)
            .destination(destination)
            .message(message)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(to, error = %e, "SES send failed");
                EmailError::SendFailed(e.to_string())
            })?;

        tracing::debug!(to, subject, "email sent via SES");
        Ok(())
    }

    fn from_address(&self) -> &str {
        &self.from_address
    }
}
