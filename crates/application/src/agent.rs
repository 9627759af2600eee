//! Weather agent - the tool-calling conversation loop
//!
//! Asks the chat model for the next assistant turn; while that turn requests
//! tools, runs them through the registry, appends one result per call and
//! asks again. A reply without tool calls ends the loop.

use std::{fmt, sync::Arc, time::Instant};

use ai_core::{ChatEngine, ChatRequest, ToolDefinition};
use domain::{Conversation, ToolInvocation};
use tracing::{debug, info, instrument, warn};

use crate::{error::ApplicationError, tools::ToolRegistry};

/// Default bound on model round-trips per query
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Step of the conversation loop
#[derive(Debug)]
enum AgentState {
    AwaitingModel,
    ExecutingTools(Vec<ToolInvocation>),
    Done,
}

/// Answers weather questions by letting the model call weather tools
pub struct WeatherAgent {
    engine: Arc<dyn ChatEngine>,
    registry: ToolRegistry,
    max_iterations: usize,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl fmt::Debug for WeatherAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherAgent")
            .field("registry", &self.registry)
            .field("max_iterations", &self.max_iterations)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl WeatherAgent {
    /// Create an agent using the engine's default sampling settings
    pub fn new(engine: Arc<dyn ChatEngine>, registry: ToolRegistry) -> Self {
        Self {
            engine,
            registry,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Bound the number of model calls per query (at least one)
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Override the model for every request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the output token limit
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Model used for requests: the override, else the engine default
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.engine.default_model())
    }

    /// Tools available to the model
    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer one query
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn run(&self, query: &str) -> Result<String, ApplicationError> {
        let conversation = self.run_conversation(Conversation::seeded(query)).await?;
        Ok(conversation.final_answer())
    }

    /// Drive a conversation until the model stops requesting tools
    ///
    /// Returns the full transcript.
    #[instrument(skip(self, conversation), fields(turns = conversation.len()))]
    pub async fn run_conversation(
        &self,
        mut conversation: Conversation,
    ) -> Result<Conversation, ApplicationError> {
        let start = Instant::now();
        let tools = self.registry.definitions();
        let mut model_calls = 0usize;
        let mut tool_calls = 0usize;
        let mut state = AgentState::AwaitingModel;

        loop {
            state = match state {
                AgentState::AwaitingModel => {
                    if model_calls >= self.max_iterations {
                        warn!(model_calls, "Model kept requesting tools, giving up");
                        return Err(ApplicationError::ToolLoopLimit(self.max_iterations));
                    }
                    model_calls += 1;

                    let response = self
                        .engine
                        .complete(self.request_for(&conversation, &tools))
                        .await?;
                    debug!(
                        model = %response.model,
                        tokens = ?response.usage,
                        tool_calls = response.tool_calls.len(),
                        "Model replied"
                    );
                    conversation.push(response.into_turn());

                    let pending = conversation.pending_tool_calls();
                    if pending.is_empty() {
                        AgentState::Done
                    } else {
                        AgentState::ExecutingTools(pending.to_vec())
                    }
                },
                AgentState::ExecutingTools(calls) => {
                    for call in &calls {
                        debug!(tool = %call.tool_name, call_id = %call.call_id, "Dispatching tool call");
                        let result = self.registry.dispatch(call).await;
                        conversation.push(result);
                        tool_calls += 1;
                    }
                    AgentState::AwaitingModel
                },
                AgentState::Done => {
                    info!(
                        model_calls,
                        tool_calls,
                        latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Query answered"
                    );
                    return Ok(conversation);
                },
            };
        }
    }

    fn request_for(&self, conversation: &Conversation, tools: &[ToolDefinition]) -> ChatRequest {
        let mut request = ChatRequest::new(conversation.turns().to_vec()).with_tools(tools.to_vec());
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_core::{ChatResponse, InferenceError};
    use async_trait::async_trait;
    use domain::{
        GeoLocation, INSTRUCTION_FRAMING, LocationTable, ToolArguments, Turn,
    };
    use integration_weather::{
        AirQuality, CurrentConditions, DailyForecast, HourlyForecast, SkyCondition,
        WeatherClient, WeatherError,
    };
    use mockall::{Sequence, mock};

    use super::*;
    use crate::tools::{ToolHandler, WeatherTools};

    mock! {
        pub Engine {}

        #[async_trait]
        impl ChatEngine for Engine {
            async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, InferenceError>;
            fn default_model(&self) -> &str;
        }
    }

    mock! {
        pub Weather {}

        #[async_trait]
        impl WeatherClient for Weather {
            fn has_credentials(&self) -> bool;
            async fn get_realtime(&self, location: GeoLocation) -> Result<CurrentConditions, WeatherError>;
            async fn get_hourly(&self, location: GeoLocation, hours: u8) -> Result<HourlyForecast, WeatherError>;
            async fn get_daily(&self, location: GeoLocation, days: u8) -> Result<DailyForecast, WeatherError>;
        }
    }

    /// Records how often it was called
    struct CountingTool {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolHandler for CountingTool {
        fn name(&self) -> &str {
            "count"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("count", "Counts calls", serde_json::json!({"type": "object"}))
        }

        async fn invoke(&self, _arguments: &ToolArguments) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            format!("called {n} times")
        }
    }

    fn counting_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CountingTool {
            calls: Arc::clone(&calls),
        }));
        (registry, calls)
    }

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolInvocation {
        let serde_json::Value::Object(arguments) = arguments else {
            panic!("expected object");
        };
        ToolInvocation::new(id, name, arguments)
    }

    fn sample_conditions() -> CurrentConditions {
        CurrentConditions {
            temperature: 18.0,
            humidity: 0.4,
            sky: SkyCondition::PartlyCloudyDay,
            wind_speed: 1.5,
            wind_direction: 90.0,
            precipitation_intensity: 0.0,
            air_quality: AirQuality {
                pm25: 12.0,
                pm10: 20.0,
                aqi_chn: 30.0,
            },
            ultraviolet: "Low".to_string(),
            comfort: "Cool".to_string(),
        }
    }

    #[test]
    fn max_iterations_is_at_least_one() {
        let (registry, _) = counting_registry();
        let agent = WeatherAgent::new(Arc::new(MockEngine::new()), registry).with_max_iterations(0);
        assert_eq!(agent.max_iterations(), 1);
    }

    #[test]
    fn model_override_wins() {
        let (registry, _) = counting_registry();
        let agent = WeatherAgent::new(Arc::new(MockEngine::new()), registry).with_model("deepseek-reasoner");
        assert_eq!(agent.model(), "deepseek-reasoner");
    }

    #[test]
    fn debug_output() {
        let (registry, _) = counting_registry();
        let agent = WeatherAgent::new(Arc::new(MockEngine::new()), registry);
        let debug = format!("{agent:?}");
        assert!(debug.contains("WeatherAgent"));
        assert!(debug.contains("max_iterations: 10"));
    }

    #[tokio::test]
    async fn reply_without_tools_is_returned_verbatim() {
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .times(1)
            .returning(|_| Ok(ChatResponse::text("I can only answer weather questions.")));
        let (registry, calls) = counting_registry();

        let agent = WeatherAgent::new(Arc::new(engine), registry);
        let answer = agent.run("Tell me a joke").await.unwrap();

        assert_eq!(answer, "I can only answer weather questions.");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_request_is_seeded_query_with_tools() {
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .withf(|req| {
                req.turns.len() == 1
                    && req.turns[0].content() == format!("{INSTRUCTION_FRAMING}Weather in Paris?")
                    && req.tools.len() == 1
                    && req.tools[0].name() == "count"
                    && req.model.as_deref() == Some("deepseek-chat")
                    && req.temperature == Some(0.7)
                    && req.max_tokens == Some(1000)
            })
            .times(1)
            .returning(|_| Ok(ChatResponse::text("ok")));
        let (registry, _) = counting_registry();

        let agent = WeatherAgent::new(Arc::new(engine), registry)
            .with_model("deepseek-chat")
            .with_temperature(0.7)
            .with_max_tokens(1000);
        assert_eq!(agent.run("Weather in Paris?").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn one_tool_call_then_answer() {
        let mut seq = Sequence::new();
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(ChatResponse::tool_calls(vec![call(
                    "call_1",
                    "count",
                    serde_json::json!({}),
                )]))
            });
        engine
            .expect_complete()
            .withf(|req| {
                req.turns.len() == 3
                    && matches!(&req.turns[2], Turn::Tool(r) if r.call_id == "call_1" && r.content == "called 1 times")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChatResponse::text("Done counting")));
        let (registry, calls) = counting_registry();

        let agent = WeatherAgent::new(Arc::new(engine), registry);
        let conversation = agent
            .run_conversation(Conversation::seeded("count once"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(conversation.len(), 4);
        let results: Vec<_> = conversation
            .turns()
            .iter()
            .filter(|t| matches!(t, Turn::Tool(_)))
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(conversation.final_answer(), "Done counting");
    }

    #[tokio::test]
    async fn multiple_calls_in_one_turn_run_in_order() {
        let mut seq = Sequence::new();
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(ChatResponse::tool_calls(vec![
                    call("a", "count", serde_json::json!({})),
                    call("b", "get_moon_phase", serde_json::json!({})),
                    call("c", "count", serde_json::json!({})),
                ]))
            });
        engine
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChatResponse::text("final")));
        let (registry, _) = counting_registry();

        let agent = WeatherAgent::new(Arc::new(engine), registry);
        let conversation = agent
            .run_conversation(Conversation::seeded("q"))
            .await
            .unwrap();

        let results: Vec<(&str, &str)> = conversation
            .turns()
            .iter()
            .filter_map(|t| match t {
                Turn::Tool(r) => Some((r.call_id.as_str(), r.content.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            results,
            [
                ("a", "called 1 times"),
                ("b", "Unknown tool: get_moon_phase"),
                ("c", "called 2 times"),
            ]
        );
    }

    #[tokio::test]
    async fn loop_limit_is_enforced() {
        let mut engine = MockEngine::new();
        engine.expect_complete().times(3).returning(|_| {
            Ok(ChatResponse::tool_calls(vec![call(
                "again",
                "count",
                serde_json::json!({}),
            )]))
        });
        let (registry, calls) = counting_registry();

        let agent = WeatherAgent::new(Arc::new(engine), registry).with_max_iterations(3);
        let err = agent.run("loop forever").await.unwrap_err();

        assert!(matches!(err, ApplicationError::ToolLoopLimit(3)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn inference_error_propagates() {
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .returning(|_| Err(InferenceError::Unauthorized("bad key".to_string())));
        let (registry, _) = counting_registry();

        let agent = WeatherAgent::new(Arc::new(engine), registry);
        let err = agent.run("hi").await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Inference(InferenceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn realtime_weather_round_trip() {
        let mut weather = MockWeather::new();
        weather.expect_has_credentials().return_const(true);
        weather
            .expect_get_realtime()
            .times(1)
            .returning(|_| Ok(sample_conditions()));
        let tools = WeatherTools::new(Arc::new(weather), Arc::new(LocationTable::builtin()));

        let mut seq = Sequence::new();
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .withf(|req| req.tools.len() == 3)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(ChatResponse::tool_calls(vec![call(
                    "call_w",
                    "get_realtime_weather",
                    serde_json::json!({"location": "Beijing"}),
                )]))
            });
        engine
            .expect_complete()
            .withf(|req| {
                matches!(req.turns.last(), Some(Turn::Tool(r))
                    if r.call_id == "call_w" && r.content.starts_with("Weather in Beijing:"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChatResponse::text("It is 18°C and partly cloudy in Beijing.")));

        let agent = WeatherAgent::new(Arc::new(engine), ToolRegistry::weather(&tools));
        let answer = agent.run("What's the weather in Beijing?").await.unwrap();
        assert_eq!(answer, "It is 18°C and partly cloudy in Beijing.");
    }

    #[tokio::test]
    async fn unknown_location_is_reported_to_model() {
        let mut weather = MockWeather::new();
        weather.expect_has_credentials().return_const(true);
        weather.expect_get_realtime().times(0);
        let tools = WeatherTools::new(Arc::new(weather), Arc::new(LocationTable::builtin()));

        let mut seq = Sequence::new();
        let mut engine = MockEngine::new();
        engine
            .expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(ChatResponse::tool_calls(vec![call(
                    "call_x",
                    "get_realtime_weather",
                    serde_json::json!({"location": "Atlantis"}),
                )]))
            });
        engine
            .expect_complete()
            .withf(|req| {
                matches!(req.turns.last(), Some(Turn::Tool(r)) if r.content.contains("not found"))
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ChatResponse::text("I don't know Atlantis.")));

        let agent = WeatherAgent::new(Arc::new(engine), ToolRegistry::weather(&tools));
        assert_eq!(agent.run("Atlantis?").await.unwrap(), "I don't know Atlantis.");
    }
}
