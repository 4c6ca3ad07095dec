use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use summeval_core::{ChatModel, ChatRequest, ChatResponse, Message, SummevalError, TokenUsage};
use summeval_models::{ProviderBackend, ProviderRequest, ProviderResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection and sampling settings for an OpenAI-compatible judge endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: Option<u32>,
    /// Used only when the request carries no temperature of its own.
    pub temperature: Option<f64>,
    pub seed: Option<u64>,
    /// Ask the API to constrain the reply to a single JSON object.
    pub json_mode: bool,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: None,
            temperature: None,
            seed: None,
            json_mode: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, limit: u32) -> Self {
        self.max_tokens = Some(limit);
        self
    }

    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    pub fn with_seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let role = match message {
            Message::System { .. } => "system",
            Message::Human { .. } => "user",
            Message::AI { .. } => "assistant",
        };
        Self {
            role,
            content: message.content(),
        }
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl From<WireUsage> for TokenUsage {
    fn from(usage: WireUsage) -> Self {
        TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct ErrorReply {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Judge client for the `/chat/completions` endpoint of OpenAI and
/// compatible servers.
pub struct OpenAiChatModel {
    config: OpenAiConfig,
    backend: Arc<dyn ProviderBackend>,
}

impl OpenAiChatModel {
    pub fn new(config: OpenAiConfig, backend: Arc<dyn ProviderBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// The HTTP request [`chat`](ChatModel::chat) would send for `request`.
    pub fn build_request(&self, request: &ChatRequest) -> Result<ProviderRequest, SummevalError> {
        let body = CompletionBody {
            model: &self.config.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            max_tokens: self.config.max_tokens,
            temperature: request.temperature.or(self.config.temperature),
            seed: self.config.seed,
            response_format: self
                .config
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| SummevalError::Parsing(format!("failed to encode request: {e}")))?;

        Ok(ProviderRequest {
            url: self.config.completions_url(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.config.api_key),
                ),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }
}

fn error_message(body: &Value, fallback: &str) -> String {
    serde_json::from_value::<ErrorReply>(body.clone())
        .ok()
        .and_then(|reply| reply.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| fallback.to_string())
}

fn into_chat_response(resp: ProviderResponse) -> Result<ChatResponse, SummevalError> {
    match resp.status {
        429 => return Err(SummevalError::RateLimit(error_message(&resp.body, "rate limited"))),
        status if status >= 400 => {
            return Err(SummevalError::Model(format!(
                "OpenAI API error ({status}): {}",
                error_message(&resp.body, "unknown API error")
            )))
        }
        _ => {}
    }

    let reply: CompletionReply = serde_json::from_value(resp.body)
        .map_err(|e| SummevalError::Parsing(format!("unexpected completion body: {e}")))?;
    let choice = reply
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| SummevalError::Parsing("OpenAI response has no choices".to_string()))?;

    Ok(ChatResponse {
        message: Message::ai(choice.message.content.unwrap_or_default()),
        usage: reply.usage.map(TokenUsage::from),
    })
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SummevalError> {
        let provider_request = self.build_request(&request)?;
        let resp = self.backend.send(provider_request).await?;
        into_chat_response(resp)
    }
}
