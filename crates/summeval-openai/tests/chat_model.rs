use std::sync::Arc;

use serde_json::json;
use summeval_core::{ChatModel, ChatRequest, Message, SummevalError};
use summeval_models::{FakeBackend, ProviderResponse};
use summeval_openai::{OpenAiChatModel, OpenAiConfig, DEFAULT_BASE_URL};

fn setup(backend: Arc<FakeBackend>) -> OpenAiChatModel {
    let config = OpenAiConfig::new("test-key", "gpt-4o-mini").with_max_tokens(256);
    OpenAiChatModel::new(config, backend)
}

fn ok_body(content: &str) -> ProviderResponse {
    ProviderResponse {
        status: 200,
        body: json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }),
    }
}

// ---------------------------------------------------------------------------
// OpenAiConfig
// ---------------------------------------------------------------------------

#[test]
fn config_defaults() {
    let config = OpenAiConfig::new("key", "gpt-4o-mini");
    assert_eq!(config.api_key, "key");
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert!(config.max_tokens.is_none());
    assert!(config.temperature.is_none());
    assert!(config.seed.is_none());
    assert!(!config.json_mode);
}

#[test]
fn config_builder_methods() {
    let config = OpenAiConfig::new("key", "judge")
        .with_base_url("http://localhost:8080/v1")
        .with_max_tokens(500)
        .with_temperature(0.5)
        .with_seed(7)
        .with_json_mode(true);

    assert_eq!(config.base_url, "http://localhost:8080/v1");
    assert_eq!(config.max_tokens, Some(500));
    assert_eq!(config.temperature, Some(0.5));
    assert_eq!(config.seed, Some(7));
    assert!(config.json_mode);
}

// ---------------------------------------------------------------------------
// build_request
// ---------------------------------------------------------------------------

#[test]
fn build_request_maps_roles_and_headers() {
    let model = setup(Arc::new(FakeBackend::new()));
    let request = ChatRequest::new(vec![
        Message::system("You grade summaries."),
        Message::human("prompt"),
        Message::ai("previous"),
    ]);
    let provider_req = model.build_request(&request).unwrap();

    assert_eq!(
        provider_req.url,
        "https://api.openai.com/v1/chat/completions"
    );
    assert!(provider_req
        .headers
        .iter()
        .any(|(k, v)| k == "Authorization" && v == "Bearer test-key"));

    let roles: Vec<&str> = provider_req.body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant"]);
    assert_eq!(provider_req.body["max_tokens"], 256);
    assert!(provider_req.body.get("temperature").is_none());
    assert!(provider_req.body.get("response_format").is_none());
}

#[test]
fn request_temperature_overrides_config() {
    let config = OpenAiConfig::new("k", "m").with_temperature(0.9);
    let model = OpenAiChatModel::new(config, Arc::new(FakeBackend::new()));

    let default_req = model
        .build_request(&ChatRequest::new(vec![Message::human("x")]))
        .unwrap();
    assert_eq!(default_req.body["temperature"], 0.9);

    let judged = model
        .build_request(&ChatRequest::new(vec![Message::human("x")]).with_temperature(0.2))
        .unwrap();
    assert_eq!(judged.body["temperature"], 0.2);
}

#[test]
fn json_mode_sets_response_format() {
    let config = OpenAiConfig::new("k", "m")
        .with_base_url("http://localhost:1234/v1/")
        .with_json_mode(true);
    let model = OpenAiChatModel::new(config, Arc::new(FakeBackend::new()));
    let req = model
        .build_request(&ChatRequest::new(vec![Message::human("x")]))
        .unwrap();

    assert_eq!(req.url, "http://localhost:1234/v1/chat/completions");
    assert_eq!(req.body["response_format"], json!({"type": "json_object"}));
}

// ---------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_parses_text_response() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(ok_body(r#"{"score": 8, "explanation": "ok"}"#));

    let model = setup(backend.clone());
    let response = model
        .chat(ChatRequest::new(vec![Message::human("Hi")]))
        .await
        .unwrap();

    assert_eq!(
        response.message.content(),
        r#"{"score": 8, "explanation": "ok"}"#
    );
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 10);
    assert_eq!(usage.output_tokens, 5);
    assert_eq!(usage.total_tokens, 15);
    assert_eq!(backend.requests().await.len(), 1);
}

#[tokio::test]
async fn chat_handles_rate_limit() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(ProviderResponse {
        status: 429,
        body: json!({"error": {"message": "too many requests"}}),
    });

    let model = setup(backend);
    let err = model
        .chat(ChatRequest::new(vec![Message::human("Hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, SummevalError::RateLimit(_)));
    assert!(err.to_string().contains("too many requests"));
}

#[tokio::test]
async fn chat_handles_api_error() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(ProviderResponse {
        status: 401,
        body: json!({"error": {"message": "invalid api key"}}),
    });

    let model = setup(backend);
    let err = model
        .chat(ChatRequest::new(vec![Message::human("Hi")]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("OpenAI API error (401)"));
}

#[tokio::test]
async fn chat_rejects_body_without_choices() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_response(ProviderResponse {
        status: 200,
        body: json!({"choices": []}),
    });

    let model = setup(backend);
    let err = model
        .chat(ChatRequest::new(vec![Message::human("Hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, SummevalError::Parsing(_)));
}

#[tokio::test]
async fn chat_propagates_backend_failure() {
    let backend = Arc::new(FakeBackend::new());
    backend.push_error(SummevalError::Model("connection refused".into()));

    let model = setup(backend);
    let err = model
        .chat(ChatRequest::new(vec![Message::human("Hi")]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}
