//! Validation helpers for API handlers

use chrono::{DateTime, Duration, Utc};
use habitek_common::{Error, Result};
use validator::ValidateEmail;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Longest expiry window a caller may request for an invitation.
pub const MAX_EXPIRY_DAYS: i64 = 365;

/// Validate and normalize an email address to lowercase.
pub fn normalize_email(email: &str) -> Result<String> {
    if !email.validate_email() {
        return Err(Error::Validation("Invalid email format".to_string()));
    }
    Ok(email.to_lowercase())
}

/// Validate a registration password.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Resolve the expiry timestamp for a new invitation.
///
/// A caller-supplied timestamp must be in the future and no more than
/// `MAX_EXPIRY_DAYS` out; absent one, the configured window applies.
pub fn resolve_expiry(
    requested: Option<DateTime<Utc>>,
    default_days: i64,
) -> Result<DateTime<Utc>> {
    let now = Utc::now();
    match requested {
        None => Ok(now + Duration::days(default_days)),
        Some(at) if at <= now => {
            Err(Error::Validation("expires_at must be in the future".to_string()))
        }
        Some(at) if at > now + Duration::days(MAX_EXPIRY_DAYS) => Err(Error::Validation(format!(
            "expires_at may be at most {} days out",
            MAX_EXPIRY_DAYS
        ))),
        Some(at) => Ok(at),
    }
}

/// Preferred language tags the platform renders.
pub fn normalize_language(tag: Option<&str>) -> String {
    match tag.map(|t| t.to_ascii_lowercase()) {
        Some(t) if t.starts_with("en") => "en".to_string(),
        _ => "fr".to_string(),
    }
}
