//! Asynchronous audit trail
//!
//! Sensitive invitation actions are recorded without blocking the request:
//! `record` pushes onto an unbounded channel and a spawned writer task
//! drains it into the audit_log table. A failed write is logged and
//! dropped; auditing never fails a request.

use axum::http::HeaderMap;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::entities::AuditLogEntry;
use crate::repository::AuditLogRepository;

/// Request-level metadata captured for every audit entry.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestMetadata {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            ip_address,
            user_agent,
        }
    }

    pub fn unknown() -> Self {
        Self {
            ip_address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }
}

/// One recordable audit event.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub invitation_id: Option<Uuid>,
    pub action: String,
    pub actor_id: Option<Uuid>,
    pub meta: RequestMetadata,
    pub previous_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, meta: RequestMetadata) -> Self {
        Self {
            invitation_id: None,
            action: action.into(),
            actor_id: None,
            meta,
            previous_value: None,
            new_value: None,
            metadata: None,
        }
    }

    pub fn invitation(mut self, invitation_id: Uuid) -> Self {
        self.invitation_id = Some(invitation_id);
        self
    }

    pub fn actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn new_value(mut self, value: serde_json::Value) -> Self {
        self.new_value = Some(value);
        self
    }

    pub fn metadata(mut self, value: serde_json::Value) -> Self {
        self.metadata = Some(value);
        self
    }
}

/// Handle for fire-and-forget audit recording.
#[derive(Clone)]
pub struct AuditTrail {
    sender: mpsc::UnboundedSender<AuditEvent>,
}

impl AuditTrail {
    /// Spawn the writer task and return the recording handle.
    pub fn spawn(repository: AuditLogRepository) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AuditEvent>();
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let entry = AuditLogEntry {
                    id: Uuid::new_v4(),
                    invitation_id: event.invitation_id,
                    action: event.action.clone(),
                    actor_id: event.actor_id,
                    ip_address: event.meta.ip_address.clone(),
                    user_agent: event.meta.user_agent.clone(),
                    previous_value: event.previous_value.clone(),
                    new_value: event.new_value.clone(),
                    metadata: event.metadata.clone(),
                    created_at: Utc::now(),
                };
                if let Err(e) = repository.insert(&entry).await {
                    tracing::warn!(action = %event.action, error = %e, "failed to write audit entry");
                }
            }
        });
        Self { sender }
    }

    /// Record an event. Never blocks and never fails the caller.
    pub fn record(&self, event: AuditEvent) {
        if self.sender.send(event).is_err() {
            tracing::warn!("audit writer task is gone; dropping audit event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("user-agent", HeaderValue::from_static("Mozilla/5.0"));
        let meta = RequestMetadata::from_headers(&headers);
        assert_eq!(meta.ip_address, "203.0.113.7");
        assert_eq!(meta.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn metadata_falls_back_to_unknown() {
        let meta = RequestMetadata::from_headers(&HeaderMap::new());
        assert_eq!(meta.ip_address, "unknown");
        assert_eq!(meta.user_agent, "unknown");
    }

    #[test]
    fn event_builder_sets_fields() {
        let id = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let event = AuditEvent::new("invitation_created", RequestMetadata::unknown())
            .invitation(id)
            .actor(actor)
            .new_value(serde_json::json!({"email": "a@example.com"}));
        assert_eq!(event.action, "invitation_created");
        assert_eq!(event.invitation_id, Some(id));
        assert_eq!(event.actor_id, Some(actor));
        assert!(event.new_value.is_some());
        assert!(event.previous_value.is_none());
    }
}
