//! Application configuration
//!
//! Layered, lowest precedence first:
//! 1. built-in defaults
//! 2. optional `config.toml` in the working directory
//! 3. `WEATHER_AGENT_*` environment variables (`__` separates sections)
//! 4. the well-known `DEEPSEEK_*` and `CAIYUN_WEATHER_API_TOKEN` variables
//!
//! A `.env` file is read into the process environment before any of this.

mod agent;

use std::{collections::BTreeMap, collections::HashMap, path::Path};

use ai_core::InferenceConfig;
use domain::{DomainError, LocationTable};
use integration_weather::WeatherConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub use agent::{AgentConfig, GeoLocationConfig};

/// Prefix of structured environment overrides
pub const ENV_PREFIX: &str = "WEATHER_AGENT";

/// Chat model API key
pub const API_KEY_VAR: &str = "DEEPSEEK_API_KEY";
/// Chat model base URL
pub const BASE_URL_VAR: &str = "DEEPSEEK_BASE_URL";
/// Chat model name
pub const MODEL_VAR: &str = "DEEPSEEK_MODEL";
/// Weather API token
pub const WEATHER_TOKEN_VAR: &str = integration_weather::TOKEN_ENV_VAR;

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No chat model API key
    #[error("DEEPSEEK_API_KEY not found in environment variables. Please set it in your .env file.")]
    MissingApiKey,

    /// An extra `[locations]` entry is unusable
    #[error("Invalid location '{name}': {source}")]
    InvalidLocation {
        name: String,
        #[source]
        source: DomainError,
    },

    /// A value is out of range
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Chat model settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Caiyun weather settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Conversation loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Extra named locations, added to the built-in table
    #[serde(default)]
    pub locations: BTreeMap<String, GeoLocationConfig>,
}

fn non_blank(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AppConfig {
    /// Load configuration from `.env`, a config file and the environment
    ///
    /// Without an explicit file, `config.toml` (or any supported extension
    /// of `config`) in the working directory is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(ConfigError::Invalid(format!(".env: {e}"))),
        }

        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(Some(file.unwrap_or_else(|| Path::new("config"))), &env)
    }

    /// Load configuration from an optional file and an explicit environment
    ///
    /// `file` may omit its extension; a missing file is not an error.
    pub fn load_from(file: Option<&Path>, env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let structured: config::Map<String, String> =
            env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        let mut builder = config::Config::builder()
            .set_default("inference.base_url", "https://api.deepseek.com")?
            .set_default("inference.default_model", "deepseek-chat")?
            .set_default("weather.base_url", "https://api.caiyunapp.com/v2.6")?
            .set_default("weather.lang", "en_US")?
            .set_default("agent.max_iterations", 10)?;

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(false));
        }

        let config = builder
            // e.g. WEATHER_AGENT_INFERENCE__TEMPERATURE=0.3
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(structured)),
            )
            .set_override_option("inference.api_key", non_blank(env, API_KEY_VAR))?
            .set_override_option("inference.base_url", non_blank(env, BASE_URL_VAR))?
            .set_override_option("inference.default_model", non_blank(env, MODEL_VAR))?
            .set_override_option("weather.api_token", non_blank(env, WEATHER_TOKEN_VAR))?
            .build()?;

        let app: Self = config.try_deserialize()?;
        info!(
            base_url = %app.inference.base_url,
            model = %app.inference.default_model,
            weather_token = app.weather.has_token(),
            extra_locations = app.locations.len(),
            "Configuration loaded"
        );
        Ok(app)
    }

    /// Check everything that must hold before the agent can start
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.inference.has_api_key() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(ConfigError::Invalid(format!(
                "inference.temperature must be between 0.0 and 2.0, got {}",
                self.inference.temperature
            )));
        }
        self.location_table().map(|_| ())
    }

    /// Built-in locations plus the configured extras
    pub fn location_table(&self) -> Result<LocationTable, ConfigError> {
        let mut table = LocationTable::builtin();
        for (name, entry) in &self.locations {
            table
                .insert(name, entry.latitude, entry.longitude)
                .map_err(|source| ConfigError::InvalidLocation {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(table)
    }
}
