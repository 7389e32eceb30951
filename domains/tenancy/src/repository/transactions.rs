//! Transactional free functions for the tenancy domain
//!
//! Multi-statement work (supersede-then-insert on create, the whole
//! acceptance flow) runs through these inside one `sqlx::Transaction`;
//! dropping the transaction without commit rolls everything back.

use habitek_common::RepositoryError;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::{Invitation, Membership, User, UserResidence};

/// Remove any still-pending invitation for the same (organization, email)
/// before inserting a replacement. Accepted rows are never touched.
pub async fn delete_pending_invitations_tx(
    transaction: &mut Transaction<'_, Postgres>,
    organization_id: Uuid,
    email: &str,
) -> std::result::Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM invitations \
         WHERE organization_id = $1 AND email = $2 AND accepted_at IS NULL",
    )
    .bind(organization_id)
    .bind(email)
    .execute(&mut **transaction)
    .await?;
    Ok(result.rows_affected())
}

pub async fn create_invitation_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invitation: &Invitation,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO invitations
            (id, organization_id, residence_id, invited_by, email, role,
             token, token_hash, personal_message, language, expires_at,
             accepted_at, accepted_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(invitation.id)
    .bind(invitation.organization_id)
    .bind(invitation.residence_id)
    .bind(invitation.invited_by)
    .bind(&invitation.email)
    .bind(invitation.role)
    .bind(&invitation.token)
    .bind(&invitation.token_hash)
    .bind(&invitation.personal_message)
    .bind(&invitation.language)
    .bind(invitation.expires_at)
    .bind(invitation.accepted_at)
    .bind(invitation.accepted_by)
    .bind(invitation.created_at)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

pub async fn create_user_tx(
    transaction: &mut Transaction<'_, Postgres>,
    user: &User,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users
            (id, email, role, first_name, last_name, password_hash,
             preferred_language, deactivated_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(user.role)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.password_hash)
    .bind(&user.preferred_language)
    .bind(user.deactivated_at)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

pub async fn create_membership_tx(
    transaction: &mut Transaction<'_, Postgres>,
    membership: &Membership,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO memberships (id, organization_id, user_id, role, full_access, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(membership.id)
    .bind(membership.organization_id)
    .bind(membership.user_id)
    .bind(membership.role)
    .bind(membership.full_access)
    .bind(membership.created_at)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

pub async fn create_user_residence_tx(
    transaction: &mut Transaction<'_, Postgres>,
    link: &UserResidence,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_residences (id, user_id, residence_id, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(link.id)
    .bind(link.user_id)
    .bind(link.residence_id)
    .bind(link.created_at)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}

/// Mark an invitation accepted, exactly once.
///
/// The `accepted_at IS NULL` predicate makes concurrent acceptances race
/// safely: the loser updates zero rows and gets `NotFound`, rolling back
/// its user creation.
pub async fn mark_invitation_accepted_tx(
    transaction: &mut Transaction<'_, Postgres>,
    invitation_id: Uuid,
    accepted_by: Uuid,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE invitations \
         SET accepted_at = NOW(), accepted_by = $2 \
         WHERE id = $1 AND accepted_at IS NULL",
    )
    .bind(invitation_id)
    .bind(accepted_by)
    .execute(&mut **transaction)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
