//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use inventra_auth::{ConfigError, TokenConfig};

pub const JWT_SECRET_ENV: &str = "INVENTRA_JWT_SECRET";
pub const JWT_ALGORITHM_ENV: &str = "INVENTRA_JWT_ALGORITHM";
pub const JWT_TTL_ENV: &str = "INVENTRA_JWT_TTL_SECS";
pub const BIND_ADDR_ENV: &str = "INVENTRA_BIND_ADDR";
pub const ROOT_PASSWORD_ENV: &str = "INVENTRA_ROOT_PASSWORD";

const DEV_SECRET: &str = "dev-secret";
const DEFAULT_TTL_SECS: i64 = 3600;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error(transparent)]
    Token(#[from] ConfigError),

    #[error("INVENTRA_JWT_TTL_SECS must be a whole number of seconds, got '{0}'")]
    InvalidTtl(String),

    #[error("INVENTRA_BIND_ADDR is not a socket address: '{0}'")]
    InvalidBindAddr(String),
}

#[derive(Clone)]
pub struct ApiConfig {
    pub token: TokenConfig,
    pub bind_addr: SocketAddr,
    /// When set, a `root` principal with this password is seeded at startup.
    pub root_password: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV).unwrap_or_else(|| {
            tracing::warn!("{JWT_SECRET_ENV} not set; using insecure dev default");
            DEV_SECRET.to_string()
        });

        let algorithm = match lookup(JWT_ALGORITHM_ENV) {
            Some(name) => TokenConfig::parse_algorithm(&name)?,
            None => inventra_auth::Algorithm::HS256,
        };

        let ttl = match lookup(JWT_TTL_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or(ApiConfigError::InvalidTtl(raw))?,
            None => Duration::seconds(DEFAULT_TTL_SECS),
        };

        let bind_raw = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ApiConfigError::InvalidBindAddr(bind_raw.clone()))?;

        Ok(Self {
            token: TokenConfig::new(secret, algorithm, ttl)?,
            bind_addr,
            root_password: lookup(ROOT_PASSWORD_ENV).filter(|p| !p.is_empty()),
        })
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("token", &self.token)
            .field("bind_addr", &self.bind_addr)
            .field("root_password", &self.root_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
