/**
 * Server Configuration
 *
 * This module loads the server configuration from environment variables.
 *
 * # Variables
 *
 * - `COLLAB_PORT` - listening port (default 8787)
 * - `COLLAB_TOKEN_SECRET` - capability token signing secret
 * - `APP_ENV` - `production` selects production mode
 * - `COLLAB_URL` - collaboration service base URL as seen by the web tier
 * - `LIVE_STREAM_HEARTBEAT_SECS` - live stream heartbeat interval (default 15)
 * - `COLLAB_KEEPALIVE_SECS` - collaboration socket ping interval (default 30)
 *
 * # Error Handling
 *
 * Unlike optional services, a malformed value is fatal: the server refuses
 * to start rather than run with a guessed configuration.
 */

use std::time::Duration;

use crate::shared::config::{AppConfig, ConfigError, Environment};

/// Load configuration from the process environment
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_config_from<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = AppConfig::builder();

    let environment = lookup("APP_ENV")
        .map(|name| Environment::from_name(&name))
        .unwrap_or_default();
    builder = builder.environment(environment);

    if let Some(port) = lookup("COLLAB_PORT") {
        let parsed = port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            name: "COLLAB_PORT",
            value: port.clone(),
        })?;
        builder = builder.port(parsed);
    }

    match lookup("COLLAB_TOKEN_SECRET").filter(|secret| !secret.is_empty()) {
        Some(secret) => builder = builder.token_secret(secret),
        None if environment.is_production() => {
            return Err(ConfigError::MissingValue("COLLAB_TOKEN_SECRET"));
        }
        None => {}
    }

    if let Some(url) = lookup("COLLAB_URL").filter(|url| !url.trim().is_empty()) {
        builder = builder.collab_url(url.trim());
    }

    if let Some(secs) = lookup("LIVE_STREAM_HEARTBEAT_SECS") {
        let parsed = secs.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            name: "LIVE_STREAM_HEARTBEAT_SECS",
            value: secs.clone(),
        })?;
        builder = builder.heartbeat_interval(Duration::from_secs(parsed));
    }

    if let Some(secs) = lookup("COLLAB_KEEPALIVE_SECS") {
        let parsed = secs.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            name: "COLLAB_KEEPALIVE_SECS",
            value: secs.clone(),
        })?;
        builder = builder.keepalive_interval(Duration::from_secs(parsed));
    }

    let config = builder.build()?;
    tracing::info!(
        "[Server] Configuration loaded: port {}, {:?} mode, collab at {}",
        config.port,
        config.environment,
        config.collab_url()
    );
    Ok(config)
}
