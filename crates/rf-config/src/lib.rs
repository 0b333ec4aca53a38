//! rusty-forum/crates/rf-config/src/lib.rs
//!
//! Runtime settings for the forum binary.
//!
//! Values come from built-in defaults overridden by the process environment.
//! Variables use the `FORUM_` prefix and `__` between nested keys, so
//! `FORUM_SERVER__PORT=8080` sets `server.port` and
//! `FORUM_AUTH__ACCESS_TOKEN_KEY` sets `auth.access_token_key`. An optional
//! `.env` file is read first.

use std::collections::HashMap;

use config::{Config, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "FORUM";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    /// Default `env_logger` filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection string, e.g. `sqlite:forum.db?mode=rwc`.
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub access_token_key: SecretString,
    pub refresh_token_key: SecretString,
    /// Access token lifetime in seconds.
    pub access_token_age: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_age: u64,
}

impl Settings {
    /// Reads `.env` if present, then the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::build(environment())
    }

    /// Same as [`Settings::load`] but reads variables from `vars` instead of
    /// the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        Self::build(environment().source(Some(vars)))
    }

    fn build(env: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite:forum.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.access_token_age", 3000)?
            .set_default("auth.refresh_token_age", 60 * 60 * 24 * 30)?
            .set_default("log_level", "info")?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid("database.max_connections must be at least 1".into()));
        }
        if self.auth.access_token_key.expose_secret().is_empty()
            || self.auth.refresh_token_key.expose_secret().is_empty()
        {
            return Err(SettingsError::Invalid("token keys must not be empty".into()));
        }
        if self.auth.access_token_age == 0 || self.auth.refresh_token_age == 0 {
            return Err(SettingsError::Invalid("token ages must be positive".into()));
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
