use std::{collections::VecDeque, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use summeval_core::SummevalError;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait ProviderBackend: Send + Sync {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, SummevalError>;
}

/// Sends provider requests over HTTP with reqwest.
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Backend whose requests fail with [`SummevalError::Timeout`] after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, SummevalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummevalError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderBackend for HttpBackend {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, SummevalError> {
        let mut builder = self.client.post(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        builder = builder.json(&request.body);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                SummevalError::Timeout(format!("HTTP request timed out: {e}"))
            } else {
                SummevalError::Model(format!("HTTP request failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        tracing::debug!(url = %request.url, status, "provider responded");
        let body: Value = response
            .json()
            .await
            .map_err(|e| SummevalError::Parsing(format!("failed to parse response JSON: {e}")))?;

        Ok(ProviderResponse { status, body })
    }
}

/// Test backend with queued responses. Every request it receives is kept
/// for later inspection.
pub struct FakeBackend {
    responses: Arc<Mutex<VecDeque<Result<ProviderResponse, SummevalError>>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_response(&self, response: ProviderResponse) -> &Self {
        self.enqueue(Ok(response))
    }

    pub fn push_error(&self, error: SummevalError) -> &Self {
        self.enqueue(Err(error))
    }

    // Only called while a test sets up its script, before any request runs.
    fn enqueue(&self, reply: Result<ProviderResponse, SummevalError>) -> &Self {
        self.responses
            .try_lock()
            .expect("FakeBackend scripted while a request was in flight")
            .push_back(reply);
        self
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderBackend for FakeBackend {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderResponse, SummevalError> {
        self.requests.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        responses
            .pop_front()
            .unwrap_or_else(|| Err(SummevalError::Model("FakeBackend exhausted".to_string())))
    }
}
