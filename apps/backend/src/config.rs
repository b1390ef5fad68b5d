//! Env-var driven process configuration. Read once at startup; nothing
//! here is reloaded at runtime.

use crate::error::AppError;

pub struct Config {
    pub bind_host: String,
    pub bind_port: u16,
    pub database_url: String,
    pub redis_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let bind_host = std::env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let bind_port = std::env::var("BIND_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| AppError::config("BIND_PORT must be a valid port number"))?;
        let database_url = std::env::var("DATABASE_URL")?;
        let redis_url = std::env::var("REDIS_URL")?;

        Ok(Self { bind_host, bind_port, database_url, redis_url })
    }
}
