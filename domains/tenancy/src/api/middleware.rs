//! Tenancy domain state and auth backend integration

use axum::extract::FromRef;
use habitek_auth::AuthBackend;

use crate::service::InvitationService;

/// Application state for the tenancy domain
#[derive(Clone)]
pub struct TenancyState {
    pub service: InvitationService,
    pub auth: AuthBackend,
}

impl FromRef<TenancyState> for AuthBackend {
    fn from_ref(state: &TenancyState) -> Self {
        state.auth.clone()
    }
}
