use std::env;
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use crate::services::accounts::DEFAULT_SESSION_TTL_HOURS;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/evently";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: '{value}'")]
    InvalidAddress { name: &'static str, value: String },

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
    /// Lifetime of a login session (`SESSION_TTL_HOURS`).
    pub session_ttl: Duration,
    /// `RUST_ENV=production`; turns on HSTS.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; unset keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }

        let listen = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        config.listen_addr = listen
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                name: "LISTEN_ADDR",
                value: listen.clone(),
            })?;

        if let Some(value) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = value
                .trim()
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "DATABASE_MAX_CONNECTIONS",
                    value,
                })?;
        }

        if let Some(value) = lookup("SESSION_TTL_HOURS") {
            let hours = value
                .trim()
                .parse()
                .ok()
                .filter(|n: &i64| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "SESSION_TTL_HOURS",
                    value,
                })?;
            config.session_ttl = Duration::hours(hours);
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = split_origins(&origins);
        }

        config.production = lookup("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        Ok(config)
    }
}

fn split_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
