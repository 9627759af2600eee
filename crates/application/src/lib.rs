//! Application layer - Tools and the conversation loop
//!
//! Holds the tool registry with the three weather tools and the
//! `WeatherAgent`, which mediates between the chat model and the tools.

pub mod agent;
pub mod error;
pub mod tools;

pub use agent::{DEFAULT_MAX_ITERATIONS, WeatherAgent};
pub use error::ApplicationError;
pub use tools::{ToolHandler, ToolRegistry, WeatherTools};
