//! User repository

use habitek_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::User;

const USER_COLUMNS: &str = "id, email, role, first_name, last_name, password_hash, \
     preferred_language, deactivated_at, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Existence check by email. Emails are stored lowercased, so the
    /// caller's input is normalized here as well.
    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1::bigint FROM users WHERE email = $1 LIMIT 1")
                .bind(email.to_lowercase())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}
