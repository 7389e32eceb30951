//! Audit log repository (append-only)

use habitek_common::Result;
use sqlx::PgPool;

use crate::domain::entities::AuditLogEntry;

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &AuditLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log
                (id, invitation_id, action, actor_id, ip_address, user_agent,
                 previous_value, new_value, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id)
        .bind(entry.invitation_id)
        .bind(&entry.action)
        .bind(entry.actor_id)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.previous_value)
        .bind(&entry.new_value)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
