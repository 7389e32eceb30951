//! Repository implementations for the tenancy domain

pub mod audit_log;
pub mod invitations;
pub mod organizations;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

pub use audit_log::AuditLogRepository;
pub use invitations::InvitationRepository;
pub use organizations::{OrganizationRepository, ResolvedResidence};
pub use transactions::{
    create_invitation_tx, create_membership_tx, create_user_residence_tx, create_user_tx,
    delete_pending_invitations_tx, mark_invitation_accepted_tx,
};
pub use users::UserRepository;

/// Combined repository access for the tenancy domain
#[derive(Clone)]
pub struct TenancyRepositories {
    pool: PgPool,
    pub users: UserRepository,
    pub organizations: OrganizationRepository,
    pub invitations: InvitationRepository,
    pub audit_log: AuditLogRepository,
}

impl TenancyRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            organizations: OrganizationRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            audit_log: AuditLogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
