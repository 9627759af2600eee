//! Tool registry
//!
//! Tools are the functions the chat model may call during a conversation.
//! Each one is a typed handler registered under its name; dispatch looks the
//! handler up by name and always produces result text, never an error.

mod weather;

use std::{collections::HashMap, fmt, sync::Arc};

use ai_core::ToolDefinition;
use async_trait::async_trait;
use domain::{ToolArguments, ToolInvocation, ToolResult};
use tracing::{debug, warn};

pub use weather::{
    DailyForecastTool, HourlyForecastTool, RealtimeWeatherTool, WeatherTools, clamp_days,
    clamp_hours,
};

/// A function the model can call
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name the model uses to call this tool
    fn name(&self) -> &str;

    /// Schema advertised to the model
    fn definition(&self) -> ToolDefinition;

    /// Run the tool; failures are reported as text
    async fn invoke(&self, arguments: &ToolArguments) -> String;
}

/// Registry of tools keyed by name
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    order: Vec<String>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the three weather tools
    #[must_use]
    pub fn weather(tools: &WeatherTools) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RealtimeWeatherTool::new(tools.clone())));
        registry.register(Arc::new(HourlyForecastTool::new(tools.clone())));
        registry.register(Arc::new(DailyForecastTool::new(tools.clone())));
        registry
    }

    /// Register a handler, replacing any handler with the same name
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(tool = %name, "Replacing previously registered tool");
        } else {
            self.order.push(name);
        }
    }

    /// Whether a tool with this name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Schemas of all tools, in registration order
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|handler| handler.definition())
            .collect()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Execute one invocation and wrap the output as its result
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> ToolResult {
        let Some(handler) = self.handlers.get(&invocation.tool_name) else {
            warn!(tool = %invocation.tool_name, call_id = %invocation.call_id, "Unknown tool requested");
            return invocation.answer(format!("Unknown tool: {}", invocation.tool_name));
        };

        debug!(
            tool = %invocation.tool_name,
            call_id = %invocation.call_id,
            arguments = %serde_json::Value::Object(invocation.arguments.clone()),
            "Executing tool"
        );

        let content = handler.invoke(&invocation.arguments).await;
        invocation.answer(content)
    }
}
