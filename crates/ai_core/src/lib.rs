//! AI Core - Chat model access with tool calling
//!
//! Provides the `ChatEngine` port used by the conversation loop and an
//! adapter for OpenAI-compatible chat-completions servers (DeepSeek by
//! default).

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use openai::OpenAiCompatibleEngine;
pub use ports::{
    ChatEngine, ChatRequest, ChatResponse, FunctionDefinition, TokenUsage, ToolDefinition,
};
