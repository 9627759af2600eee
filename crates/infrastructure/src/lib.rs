//! Infrastructure layer - Configuration and wiring
//!
//! Loads the layered configuration and assembles the concrete chat engine,
//! weather client and location table into a `WeatherAgent`.

pub mod agent_factory;
pub mod config;

pub use agent_factory::{BuildError, build_agent};
pub use config::{AgentConfig, AppConfig, ConfigError, GeoLocationConfig};
