//! Habitek application composition root
//!
//! Wires the tenancy domain router together with auth, email, and the
//! audit trail, and exposes the shared middleware layers the binaries
//! apply.

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use habitek_auth::{AuthBackend, AuthConfig};
use habitek_common::Config;
use habitek_email::{create_email_service, EmailConfig};
use habitek_tenancy::service::{InvitationService, InvitationSettings};
use habitek_tenancy::{AuditTrail, TenancyState};

/// Maximum request body size (1 MiB); invitation payloads are small.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let repos = habitek_tenancy::repository::TenancyRepositories::new(pool.clone());

    let auth = AuthBackend::new(pool, AuthConfig::new(config.jwt_secret.clone()));

    let email_config = EmailConfig::from_env()?;
    let email = create_email_service(&email_config).await;

    let audit = AuditTrail::spawn(repos.audit_log.clone());
    let service = InvitationService::new(
        repos,
        email,
        audit,
        InvitationSettings::from_config(&config),
    );

    let state = TenancyState { service, auth };

    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Habitek API v0.0.1-SNAPSHOT" }),
        )
        .merge(habitek_tenancy::routes().with_state(state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// CORS layer restricted to the configured origins (comma-separated).
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}
