//! Authentication middleware for the Habitek API
//!
//! Provides JWT validation and axum extractors that work with any domain
//! state implementing `FromRef<S>` for `AuthBackend`. The backend loads the
//! actor's identity, organization memberships, and residence associations
//! as a lightweight read model over the tables the tenancy domain owns.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::AuthBackend;
pub use claims::SessionClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AdminUser, AuthUser};
pub use types::{AuthIdentity, AuthMembership, AuthOrgKind, AuthRole};
