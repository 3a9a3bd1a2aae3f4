//! Application configuration module
//!
//! Provides the configuration values the collaboration core depends on: the
//! listening port, the shared token-signing secret and the deployment context
//! that decides whether a development secret may be substituted.

use std::time::Duration;
use thiserror::Error;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8787;

/// Default live stream heartbeat period
pub const DEFAULT_HEARTBEAT_SECS: u64 = 15;

/// Default spacing of collaboration socket pings
pub const DEFAULT_KEEPALIVE_SECS: u64 = 30;

/// Deployment context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse an `APP_ENV` value. Only `production` selects production mode.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening port
    pub port: u16,
    /// Shared HMAC secret for capability tokens
    pub token_secret: Option<String>,
    /// Deployment context
    pub environment: Environment,
    /// Base URL of the collaboration service as seen from the web tier
    pub collab_url: Option<String>,
    /// Interval between live stream heartbeat comments
    pub heartbeat_interval: Duration,
    /// Interval between pings on collaboration sockets
    pub keepalive_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            token_secret: None,
            environment: Environment::Development,
            collab_url: None,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            keepalive_interval: Duration::from_secs(DEFAULT_KEEPALIVE_SECS),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Collab service base URL, falling back to this process
    pub fn collab_url(&self) -> String {
        match &self.collab_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", self.port),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                name: "COLLAB_PORT",
                value: "0".to_string(),
            });
        }
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "LIVE_STREAM_HEARTBEAT_SECS",
                value: "0".to_string(),
            });
        }
        if self.keepalive_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "COLLAB_KEEPALIVE_SECS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    port: Option<u16>,
    token_secret: Option<String>,
    environment: Option<Environment>,
    collab_url: Option<String>,
    heartbeat_interval: Option<Duration>,
    keepalive_interval: Option<Duration>,
}

impl AppConfigBuilder {
    /// Set the listening port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the token secret. Empty strings are treated as unset.
    pub fn token_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.token_secret = if secret.is_empty() { None } else { Some(secret) };
        self
    }

    /// Set the deployment context
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set the collab service base URL
    pub fn collab_url(mut self, url: impl Into<String>) -> Self {
        self.collab_url = Some(url.into());
        self
    }

    /// Set the heartbeat interval
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = Some(interval);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            port: self.port.unwrap_or(defaults.port),
            token_secret: self.token_secret,
            environment: self.environment.unwrap_or(defaults.environment),
            collab_url: self.collab_url,
            heartbeat_interval: self.heartbeat_interval.unwrap_or(defaults.heartbeat_interval),
            keepalive_interval: self.keepalive_interval.unwrap_or(defaults.keepalive_interval),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
