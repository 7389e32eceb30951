use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::claims::SessionClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Pulls a bearer token out of the Authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get("authorization")
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken)
}

pub fn validate_jwt_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[&config.audience]);

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn sign(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims() -> SessionClaims {
        let now = Utc::now().timestamp();
        SessionClaims {
            sub: Uuid::new_v4(),
            email: Some("resident@habitek.ca".to_string()),
            iat: now,
            exp: now + 3600,
            aud: "habitek-app".to_string(),
        }
    }

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn missing_header_is_missing_credentials() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn non_bearer_scheme_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn valid_token_round_trips() {
        let config = AuthConfig::new("test-secret");
        let claims = claims();
        let token = sign(&claims, "test-secret");
        let decoded = validate_jwt_token(&token, &config).unwrap();
        assert_eq!(decoded.sub, claims.sub);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = AuthConfig::new("test-secret");
        let token = sign(&claims(), "other-secret");
        assert!(matches!(
            validate_jwt_token(&token, &config),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AuthConfig::new("test-secret");
        let mut expired = claims();
        expired.iat -= 7200;
        expired.exp -= 7200;
        let token = sign(&expired, "test-secret");
        assert!(matches!(
            validate_jwt_token(&token, &config),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let config = AuthConfig::new("test-secret");
        let mut other = claims();
        other.aud = "someone-else".to_string();
        let token = sign(&other, "test-secret");
        assert!(matches!(
            validate_jwt_token(&token, &config),
            Err(AuthError::InvalidToken)
        ));
    }
}
