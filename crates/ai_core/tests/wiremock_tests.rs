//! Integration tests for the OpenAI-compatible chat engine using WireMock
//!
//! These tests mock the `/chat/completions` endpoint to verify request
//! shape and response decoding without a real provider.

use ai_core::{ChatEngine, ChatRequest, InferenceConfig, InferenceError, OpenAiCompatibleEngine, ToolDefinition};
use domain::{ToolArguments, ToolInvocation, Turn};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn config_for_mock(base_url: &str) -> InferenceConfig {
    InferenceConfig {
        base_url: base_url.to_string(),
        default_model: "test-model".to_string(),
        timeout_ms: 5000,
        max_tokens: 1000,
        temperature: 0.7,
        ..InferenceConfig::default()
    }
    .with_api_key("sk-test")
}

fn engine_for(server: &MockServer) -> OpenAiCompatibleEngine {
    OpenAiCompatibleEngine::new(config_for_mock(&server.uri())).unwrap()
}

fn text_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28}
    })
}

fn tool_call_response(arguments: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-2",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_abc",
                    "type": "function",
                    "function": {"name": "get_realtime_weather", "arguments": arguments}
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
}

fn weather_tool() -> ToolDefinition {
    ToolDefinition::function(
        "get_realtime_weather",
        "Get the current weather for a location",
        serde_json::json!({
            "type": "object",
            "properties": {"location": {"type": "string"}},
            "required": ["location"]
        }),
    )
}

// =============================================================================
// Success paths
// =============================================================================

#[tokio::test]
async fn text_reply_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("It is sunny.")))
        .expect(1)
        .mount(&server)
        .await;

    let response = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("Weather?")]))
        .await
        .unwrap();

    assert_eq!(response.content, "It is sunny.");
    assert!(response.tool_calls.is_empty());
    assert_eq!(response.model, "test-model");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(28));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn tool_calls_are_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tool_call_response(r#"{"location": "Beijing"}"#)),
        )
        .mount(&server)
        .await;

    let response = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("Weather in Beijing?")]).with_tools(vec![weather_tool()]))
        .await
        .unwrap();

    assert_eq!(response.content, "");
    assert_eq!(response.tool_calls.len(), 1);
    let call = &response.tool_calls[0];
    assert_eq!(call.call_id, "call_abc");
    assert_eq!(call.tool_name, "get_realtime_weather");
    assert_eq!(call.arguments["location"], "Beijing");
}

#[tokio::test]
async fn request_carries_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let result = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn request_body_includes_tools_and_sampling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "max_tokens": 1000,
            "messages": [{"role": "user", "content": "Weather?"}],
            "tools": [{"type": "function", "function": {"name": "get_realtime_weather"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let result = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("Weather?")]).with_tools(vec![weather_tool()]))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn tool_results_are_sent_back_with_call_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                {"role": "user"},
                {"role": "assistant", "tool_calls": [{"id": "call_abc", "type": "function"}]},
                {"role": "tool", "tool_call_id": "call_abc", "content": "Weather in Beijing:"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Done")))
        .expect(1)
        .mount(&server)
        .await;

    let mut args = ToolArguments::new();
    args.insert("location".to_string(), serde_json::json!("Beijing"));
    let call = ToolInvocation::new("call_abc", "get_realtime_weather", args);
    let turns = vec![
        Turn::user("Weather in Beijing?"),
        Turn::assistant_with_tools("", vec![call.clone()]),
        call.answer("Weather in Beijing:").into(),
    ];

    let response = engine_for(&server)
        .complete(ChatRequest::new(turns))
        .await
        .unwrap();
    assert_eq!(response.content, "Done");
}

#[tokio::test]
async fn request_overrides_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "deepseek-reasoner"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let result = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]).with_model("deepseek-reasoner"))
        .await;
    assert!(result.is_ok());
}

// =============================================================================
// Error paths
// =============================================================================

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::RateLimited));
}

#[tokio::test]
async fn unauthorized_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Unauthorized(_)));
}

#[tokio::test]
async fn server_error_includes_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    match err {
        InferenceError::ServerError(msg) => assert!(msg.contains("500")),
        other => panic!("Expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_tool_arguments_are_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(tool_call_response("{not json")),
        )
        .mount(&server)
        .await;

    let err = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

#[tokio::test]
async fn empty_choices_are_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"model": "test-model", "choices": []})),
        )
        .mount(&server)
        .await;

    let err = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = engine_for(&server)
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("late"))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = config_for_mock(&server.uri());
    config.timeout_ms = 50;
    let engine = OpenAiCompatibleEngine::new(config).unwrap();

    let err = engine
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Timeout(50)));
}

#[tokio::test]
async fn unreachable_server_is_connection_failure() {
    let config = config_for_mock("http://127.0.0.1:1");
    let engine = OpenAiCompatibleEngine::new(config).unwrap();

    let err = engine
        .complete(ChatRequest::new(vec![Turn::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InferenceError::ConnectionFailed(_) | InferenceError::RequestFailed(_)
    ));
}
