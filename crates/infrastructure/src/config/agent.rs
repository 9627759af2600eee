//! Conversation loop and location table settings

use serde::{Deserialize, Serialize};

/// Conversation loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per query before giving up (default: 10)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

const fn default_max_iterations() -> usize {
    application::DEFAULT_MAX_ITERATIONS
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

/// Geographic location configuration (latitude/longitude pair)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocationConfig {
    /// Latitude (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude (-180.0 to 180.0)
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_defaults() {
        assert_eq!(AgentConfig::default().max_iterations, 10);
        let parsed: AgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AgentConfig::default());
    }
}
