//! HS256 bearer token verification. Token issuance is owned by the
//! external authenticator; `mint_access_token` exists only so tests can
//! produce tokens to drive the REST/WS surface.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::error::AppError;
use crate::errors::ErrorCode;

pub fn verify_access_token(token: &str, secret: &[u8]) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let decoded = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|_| AppError::UnauthorizedInvalidToken)?;
    Ok(decoded.claims)
}

/// Not reachable from any HTTP route; token issuance belongs to the
/// external authenticator. Exists for integration tests only.
pub fn mint_access_token(claims: &Claims, secret: &[u8]) -> Result<String, AppError> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AppError::internal(format!("failed to mint test token: {e}")))
}

pub fn require_bearer(header_value: Option<&str>) -> Result<&str, AppError> {
    let raw = header_value.ok_or(AppError::UnauthorizedMissingBearer)?;
    raw.strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::UnauthorizedMissingBearer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_token() {
        let secret = b"test-secret";
        let claims = Claims { sub: 42, username: "alice".into(), iat: 0, exp: 9_999_999_999 };
        let token = mint_access_token(&claims, secret).unwrap();
        let decoded = verify_access_token(&token, secret).unwrap();
        assert_eq!(decoded.sub, 42);
    }

    #[test]
    fn rejects_token_signed_with_wrong_secret() {
        let claims = Claims { sub: 1, username: "bob".into(), iat: 0, exp: 9_999_999_999 };
        let token = mint_access_token(&claims, b"right-secret").unwrap();
        assert!(verify_access_token(&token, b"wrong-secret").is_err());
    }

    #[test]
    fn require_bearer_rejects_missing_or_malformed() {
        assert!(require_bearer(None).is_err());
        assert!(require_bearer(Some("Basic abc")).is_err());
        assert_eq!(require_bearer(Some("Bearer abc")).unwrap(), "abc");
    }
}
