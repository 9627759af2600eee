//! Conversation turns and tool call records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arguments of a tool invocation (parameter name → JSON value)
pub type ToolArguments = serde_json::Map<String, serde_json::Value>;

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Opaque correlation token issued by the model
    pub call_id: String,
    /// Name of the requested tool
    pub tool_name: String,
    /// Decoded arguments
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolInvocation {
    /// Create a new invocation
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: ToolArguments,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Produce the result record answering this invocation
    pub fn answer(&self, content: impl Into<String>) -> ToolResult {
        ToolResult {
            call_id: self.call_id.clone(),
            tool_name: self.tool_name.clone(),
            content: content.into(),
        }
    }
}

/// Output of an executed tool, correlated to its invocation by `call_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Same `call_id` as the originating invocation
    pub call_id: String,
    /// Name of the tool that produced the result
    pub tool_name: String,
    /// Result text
    pub content: String,
}

/// A single turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    /// Text typed by the user
    User {
        /// Message text
        content: String,
    },
    /// Reply from the model, optionally requesting tool calls
    Assistant {
        /// Message text (may be empty when tools are requested)
        content: String,
        /// Requested tool calls, in the order the model issued them
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },
    /// Result of one tool invocation
    Tool(ToolResult),
}

impl Turn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Create an assistant turn without tool calls
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant turn requesting tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Text content of the turn
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::User { content } | Self::Assistant { content, .. } => content,
            Self::Tool(result) => &result.content,
        }
    }

    /// Tool calls requested by this turn (empty unless an assistant turn)
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolInvocation] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Whether this is an assistant turn
    #[must_use]
    pub const fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }
}

impl From<ToolResult> for Turn {
    fn from(result: ToolResult) -> Self {
        Self::Tool(result)
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { content } => write!(f, "user: {content}"),
            Self::Assistant {
                content,
                tool_calls,
            } => {
                write!(f, "assistant: {content}")?;
                for call in tool_calls {
                    write!(f, " [{}#{}]", call.tool_name, call.call_id)?;
                }
                Ok(())
            },
            Self::Tool(result) => write!(
                f,
                "tool {} ({}): {}",
                result.tool_name, result.call_id, result.content
            ),
        }
    }
}
