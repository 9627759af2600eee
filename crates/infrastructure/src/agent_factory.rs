//! Wiring of concrete adapters into a `WeatherAgent`

use std::sync::Arc;

use ai_core::{InferenceError, OpenAiCompatibleEngine};
use application::{ToolRegistry, WeatherAgent, WeatherTools};
use integration_weather::{CaiyunClient, WeatherError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError};

/// Errors while assembling the agent
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialise chat engine: {0}")]
    Inference(#[from] InferenceError),

    #[error("Failed to initialise weather client: {0}")]
    Weather(#[from] WeatherError),
}

/// Build a ready-to-use agent from validated configuration
pub fn build_agent(config: &AppConfig) -> Result<WeatherAgent, BuildError> {
    config.validate()?;

    let engine = OpenAiCompatibleEngine::new(config.inference.clone())?;
    let client = CaiyunClient::new(config.weather.clone())?;
    if !config.weather.has_token() {
        warn!("CAIYUN_WEATHER_API_TOKEN is not set, weather lookups will report an error");
    }

    let locations = Arc::new(config.location_table()?);
    let tools = WeatherTools::new(Arc::new(client), Arc::clone(&locations));
    let registry = ToolRegistry::weather(&tools);

    info!(
        tools = registry.len(),
        locations = locations.len(),
        max_iterations = config.agent.max_iterations,
        "Weather agent ready"
    );

    Ok(WeatherAgent::new(Arc::new(engine), registry).with_max_iterations(config.agent.max_iterations))
}
