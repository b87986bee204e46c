//! Runtime configuration from environment variables.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing env var {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    BadVar { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl AppConfig {
    /// Read config from the environment. `DATABASE_URL` is required;
    /// `BIND_ADDR` defaults to 0.0.0.0:3000 and `DB_MAX_CONNECTIONS` to 5.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v.parse().map_err(|_| ConfigError::BadVar {
                name: "DB_MAX_CONNECTIONS",
                value: v,
            })?,
            Err(_) => 5,
        };
        Ok(AppConfig {
            database_url,
            bind_addr,
            max_connections,
        })
    }
}
