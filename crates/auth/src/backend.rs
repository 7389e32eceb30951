use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::validate_jwt_token;
use crate::types::{AuthIdentity, AuthMembership};

/// Validates tokens and loads the request's authorization context.
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = validate_jwt_token(token, &self.config)?;
        self.load_context(claims.sub).await
    }

    pub async fn load_context(&self, user_id: Uuid) -> Result<AuthContext, AuthError> {
        let user = self.load_identity(user_id).await?;
        let memberships = self.load_memberships(user_id).await?;
        let residence_ids = self.load_residence_ids(user_id).await?;
        Ok(AuthContext {
            user,
            memberships,
            residence_ids,
        })
    }

    async fn load_identity(&self, user_id: Uuid) -> Result<AuthIdentity, AuthError> {
        sqlx::query_as::<_, AuthIdentity>(
            r#"
            SELECT id, email, role, first_name, last_name
            FROM users
            WHERE id = $1 AND deactivated_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UnknownUser)
    }

    async fn load_memberships(&self, user_id: Uuid) -> Result<Vec<AuthMembership>, AuthError> {
        let rows = sqlx::query_as::<_, AuthMembership>(
            r#"
            SELECT
                m.organization_id,
                o.name AS organization_name,
                o.kind AS organization_kind,
                m.role,
                m.full_access
            FROM memberships m
            JOIN organizations o ON o.id = m.organization_id
            WHERE m.user_id = $1
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn load_residence_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AuthError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT residence_id FROM user_residences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
