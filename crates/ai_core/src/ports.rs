//! Port definitions for the chat engine
//!
//! Defines the trait (port) that chat model adapters must implement and the
//! provider-neutral request/response types exchanged with it.

use async_trait::async_trait;
use domain::{ToolInvocation, Turn};
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Schema of a function the model may call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// JSON schema of the parameters object
    pub parameters: serde_json::Value,
}

/// A tool advertised to the model (OpenAI `tools` entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool kind, always `function`
    #[serde(rename = "type")]
    pub kind: String,
    /// Function schema
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    /// Create a function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Name of the function
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Request for the next assistant turn
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Full conversation so far, oldest first
    pub turns: Vec<Turn>,
    /// Tools the model may call
    pub tools: Vec<ToolDefinition>,
    /// Model to use (overrides config default)
    pub model: Option<String>,
    /// Temperature for sampling (overrides config default)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate (overrides config default)
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a request from a conversation
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            tools: Vec::new(),
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Advertise tools
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the model for this request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set temperature
    #[must_use]
    pub const fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set the output token limit
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model's reply
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Reply text (empty when only tools are requested)
    pub content: String,
    /// Requested tool calls, in the order issued
    pub tool_calls: Vec<ToolInvocation>,
    /// Model that generated the response
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// A plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            model: String::new(),
            usage: None,
            finish_reason: Some("stop".to_string()),
        }
    }

    /// A reply requesting tool calls
    pub fn tool_calls(tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            model: String::new(),
            usage: None,
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    /// Convert into the assistant turn to append to the conversation
    pub fn into_turn(self) -> Turn {
        Turn::assistant_with_tools(self.content, self.tool_calls)
    }
}

/// Port for chat model implementations
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Produce the next assistant turn for the conversation
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, InferenceError>;

    /// Get the current default model
    fn default_model(&self) -> &str;
}
