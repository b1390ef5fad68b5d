use serde::{Deserialize, Serialize};

/// Claims carried by the bearer token the external authenticator issues.
/// `sub` is the stable user identity; this backend never mints these
/// for production use, only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}
