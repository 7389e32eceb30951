//! HTTP surface for the tenancy domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::TenancyState;
pub use routes::routes;
