//! Server configuration from environment variables.

use socialflow_connectors::ConnectorConfig;
use std::time::Duration;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret-change-me-before-deploying-socialflow";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// HS256 signing secret, at least 32 bytes
    pub jwt_secret: String,

    /// Access token lifetime
    pub token_ttl_hours: i64,

    /// Background scheduler sweep interval; `None` leaves the sweep to
    /// `POST /scheduler/process`
    pub scheduler_interval: Option<Duration>,

    pub connectors: ConnectorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            scheduler_interval: None,
            connectors: ConnectorConfig::default(),
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

impl ServerConfig {
    /// Read `SOCIALFLOW_*` variables plus the connector settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        let interval_secs: u64 = parsed("SCHEDULER_INTERVAL_SECS", 0)?;

        Ok(Self {
            host: std::env::var("SOCIALFLOW_HOST").unwrap_or(default.host),
            port: parsed("SOCIALFLOW_PORT", default.port)?,
            jwt_secret: std::env::var("SOCIALFLOW_JWT_SECRET").unwrap_or(default.jwt_secret),
            token_ttl_hours: parsed("SOCIALFLOW_TOKEN_TTL_HOURS", default.token_ttl_hours)?,
            scheduler_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            connectors: ConnectorConfig::from_env(),
        })
    }

    pub fn is_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.is_dev_secret());
        assert!(config.jwt_secret.len() >= socialflow_auth::MIN_SECRET_LEN);
        assert!(config.scheduler_interval.is_none());
    }
}
