use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// How far in the past an event's start time may lie when it is created.
    /// Absorbs the latency between building a request and persisting it.
    pub start_time_tolerance_secs: u32,
}

impl ValidationConfig {
    /// ## Summary
    /// Returns the creation-time start tolerance as a duration.
    #[must_use]
    pub fn start_time_tolerance(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(i64::from(self.start_time_tolerance_secs))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            start_time_tolerance_secs: DEFAULT_START_TIME_TOLERANCE_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Category names the binary makes sure exist and are active.
    pub categories: Vec<String>,
}

pub const DEFAULT_START_TIME_TOLERANCE_SECS: u32 = 5;

impl Settings {
    /// ## Summary
    /// Returns a config builder holding every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "info")?
            .set_default(
                "validation.start_time_tolerance_secs",
                DEFAULT_START_TIME_TOLERANCE_SECS,
            )?
            .set_default("seed.categories", vec!["Hanging Out", "Studying"])?)
    }

    /// ## Summary
    /// Loads configuration from `config.toml` and environment variables into a `Settings`.
    /// Environment variables (`RSVP_DATABASE__URL`, ...) take precedence over the file.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// checking it fails.
    pub fn load() -> Result<Self> {
        let settings = Self::defaults()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("RSVP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        settings.check()?;
        Ok(settings)
    }

    /// ## Summary
    /// Rejects settings that deserialize fine but cannot work.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` naming the offending key.
    pub fn check(&self) -> CoreResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(CoreError::ConfigError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    Settings::load()
}
