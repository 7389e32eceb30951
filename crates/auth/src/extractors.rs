use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::backend::AuthBackend;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::extract_bearer_token;

/// Any authenticated user. Works with any app state that can hand out an
/// `AuthBackend` via `FromRef`.
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthBackend: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);
        let token = extract_bearer_token(&parts.headers)?;
        let context = backend.authenticate(token).await?;
        Ok(AuthUser(context))
    }
}

/// An authenticated platform administrator.
pub struct AdminUser(pub AuthContext);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AuthBackend: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(context) = AuthUser::from_request_parts(parts, state).await?;
        if !context.is_admin() {
            return Err(AuthError::AdminRequired);
        }
        Ok(AdminUser(context))
    }
}
