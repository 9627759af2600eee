//! Chat-completions wire format
//!
//! Translation between conversation turns and the OpenAI-compatible
//! `messages` / `tool_calls` JSON shapes.

use domain::{ToolArguments, ToolInvocation, Turn};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::InferenceError;

/// A message sent to the server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A tool call as carried on the wire (arguments are a JSON string)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

/// The assistant message in a response
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

impl From<&ToolInvocation> for WireToolCall {
    fn from(call: &ToolInvocation) -> Self {
        Self {
            id: call.call_id.clone(),
            kind: function_kind(),
            function: WireFunctionCall {
                name: call.tool_name.clone(),
                arguments: serde_json::Value::Object(call.arguments.clone()).to_string(),
            },
        }
    }
}

impl From<&Turn> for OutgoingMessage {
    fn from(turn: &Turn) -> Self {
        match turn {
            Turn::User { content } => Self {
                role: "user",
                content: content.clone(),
                tool_calls: None,
                tool_call_id: None,
            },
            Turn::Assistant {
                content,
                tool_calls,
            } => Self {
                role: "assistant",
                content: content.clone(),
                tool_calls: (!tool_calls.is_empty())
                    .then(|| tool_calls.iter().map(WireToolCall::from).collect()),
                tool_call_id: None,
            },
            Turn::Tool(result) => Self {
                role: "tool",
                content: result.content.clone(),
                tool_calls: None,
                tool_call_id: Some(result.call_id.clone()),
            },
        }
    }
}

/// Translate a whole conversation into request messages
pub fn to_wire_messages(turns: &[Turn]) -> Vec<OutgoingMessage> {
    turns.iter().map(OutgoingMessage::from).collect()
}

/// Decode one wire tool call; `None` for calls without a function name
pub fn parse_tool_call(call: WireToolCall) -> Result<Option<ToolInvocation>, InferenceError> {
    if call.function.name.is_empty() {
        warn!(call_id = %call.id, "Ignoring tool call without a function name");
        return Ok(None);
    }

    let raw = call.function.arguments.trim();
    let arguments = if raw.is_empty() {
        ToolArguments::new()
    } else {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(other) => {
                return Err(InferenceError::InvalidResponse(format!(
                    "arguments for tool '{}' must be a JSON object, got {other}",
                    call.function.name
                )));
            },
            Err(e) => {
                return Err(InferenceError::InvalidResponse(format!(
                    "arguments for tool '{}' are not valid JSON: {e}",
                    call.function.name
                )));
            },
        }
    };

    Ok(Some(ToolInvocation::new(
        call.id,
        call.function.name,
        arguments,
    )))
}

impl IncomingMessage {
    /// Split the message into text content and decoded tool calls
    pub fn into_parts(self) -> Result<(String, Vec<ToolInvocation>), InferenceError> {
        let mut invocations = Vec::new();
        for call in self.tool_calls.unwrap_or_default() {
            if let Some(invocation) = parse_tool_call(call)? {
                invocations.push(invocation);
            }
        }
        Ok((self.content.unwrap_or_default(), invocations))
    }
}
