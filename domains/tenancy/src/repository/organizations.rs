//! Organization repository
//!
//! Also owns the residence → building → organization resolution the scope
//! validator depends on.

use habitek_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Organization, OrganizationKind};

/// A residence joined up to its owning organization.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResolvedResidence {
    pub residence_id: Uuid,
    pub building_id: Uuid,
    pub organization_id: Uuid,
    pub organization_kind: OrganizationKind,
}

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, organization_id: Uuid) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, Organization>(
            "SELECT id, name, kind, active, created_at FROM organizations WHERE id = $1",
        )
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Resolve a residence to its owning organization through the building
    /// it belongs to.
    pub async fn resolve_residence(&self, residence_id: Uuid) -> Result<Option<ResolvedResidence>> {
        let row = sqlx::query_as::<_, ResolvedResidence>(
            r#"
            SELECT
                r.id AS residence_id,
                b.id AS building_id,
                o.id AS organization_id,
                o.kind AS organization_kind
            FROM residences r
            JOIN buildings b ON b.id = r.building_id
            JOIN organizations o ON o.id = b.organization_id
            WHERE r.id = $1
            "#,
        )
        .bind(residence_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
