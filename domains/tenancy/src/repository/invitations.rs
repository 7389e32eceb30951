//! Invitation repository
//!
//! Lookups key on `token_hash`, never the raw token. Pending is a derived
//! predicate (`accepted_at IS NULL AND expires_at > NOW()`) mirrored in SQL.

use habitek_common::{RepositoryError, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Invitation;

const INVITATION_COLUMNS: &str = "id, organization_id, residence_id, invited_by, email, role, \
     token, token_hash, personal_message, language, expires_at, accepted_at, accepted_by, \
     created_at";

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, invitation_id: Uuid) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1"
        ))
        .bind(invitation_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Invitations a non-admin may see: ones they sent, plus ones belonging
    /// to their organizations.
    pub async fn find_visible_to(
        &self,
        user_id: Uuid,
        organization_ids: &[Uuid],
        pending_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>> {
        let rows = if pending_only {
            sqlx::query_as::<_, Invitation>(&format!(
                "SELECT {INVITATION_COLUMNS} FROM invitations \
                 WHERE (invited_by = $1 OR organization_id = ANY($2)) \
                   AND accepted_at IS NULL AND expires_at > NOW() \
                 ORDER BY created_at DESC \
                 LIMIT $3 OFFSET $4"
            ))
            .bind(user_id)
            .bind(organization_ids)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Invitation>(&format!(
                "SELECT {INVITATION_COLUMNS} FROM invitations \
                 WHERE invited_by = $1 OR organization_id = ANY($2) \
                 ORDER BY created_at DESC \
                 LIMIT $3 OFFSET $4"
            ))
            .bind(user_id)
            .bind(organization_ids)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    /// Every invitation, for platform admins.
    pub async fn find_all(
        &self,
        pending_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>> {
        let rows = if pending_only {
            sqlx::query_as::<_, Invitation>(&format!(
                "SELECT {INVITATION_COLUMNS} FROM invitations \
                 WHERE accepted_at IS NULL AND expires_at > NOW() \
                 ORDER BY created_at DESC \
                 LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Invitation>(&format!(
                "SELECT {INVITATION_COLUMNS} FROM invitations ORDER BY created_at DESC \
                 LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    /// Pending invitations old enough for a reminder sweep.
    pub async fn find_pending_for_reminder(&self, min_age_hours: i32) -> Result<Vec<Invitation>> {
        let rows = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations \
             WHERE accepted_at IS NULL \
               AND expires_at > NOW() \
               AND created_at < NOW() - make_interval(hours => $1) \
             ORDER BY created_at ASC"
        ))
        .bind(min_age_hours)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Extend the expiry window for a resend; token is untouched.
    pub async fn extend_expiration(
        &self,
        invitation_id: Uuid,
        expiry_days: i32,
    ) -> Result<Invitation> {
        let updated = sqlx::query_as::<_, Invitation>(&format!(
            "UPDATE invitations \
             SET expires_at = NOW() + make_interval(days => $2) \
             WHERE id = $1 \
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(invitation_id)
        .bind(expiry_days)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(updated)
    }

    /// Cancellation removes the row; the audit trail keeps the history.
    pub async fn delete(&self, invitation_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(invitation_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(())
    }
}
