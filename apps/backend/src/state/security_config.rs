//! JWT verification configuration, loaded once at startup from env vars.

use crate::error::AppError;

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Vec<u8>,
}

impl SecurityConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("APP_JWT_SECRET")?;
        if secret.len() < 16 {
            return Err(AppError::config("APP_JWT_SECRET must be at least 16 bytes"));
        }
        Ok(Self { jwt_secret: secret.into_bytes() })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self { jwt_secret: b"test-secret-at-least-16-bytes".to_vec() }
    }
}
