use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a Habitek session token (HS256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}
