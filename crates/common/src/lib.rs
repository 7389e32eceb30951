//! Shared utilities, configuration, and error handling for Habitek
//!
//! This crate provides common functionality used across the Habitek application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Cryptographic helpers (hashing, constant-time comparison)
//! - Shared axum extractors

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use crypto::{constant_time_eq, hash_password, sha256_hex, verify_password};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
