use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use summeval_core::{ChatModel, ChatRequest, ChatResponse, SummevalError};

/// How often and how patiently a judge call is repeated after a transient failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total calls per request, including the first. Zero behaves like one.
    pub max_attempts: usize,
    /// Wait before the first retry; doubled for each further retry.
    pub base_delay: Duration,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Wait after the `attempt`-th failed call (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16) as u32;
        self.base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}

/// Repeats judge calls that failed with a rate limit or timeout. Any other
/// error, and the last transient one, is returned to the caller unchanged.
pub struct RetryChatModel {
    inner: Arc<dyn ChatModel>,
    policy: RetryPolicy,
}

impl RetryChatModel {
    pub fn new(inner: Arc<dyn ChatModel>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

fn transient_cause(error: &SummevalError) -> &'static str {
    match error {
        SummevalError::RateLimit(_) => "rate_limit",
        SummevalError::Timeout(_) => "timeout",
        _ => "other",
    }
}

#[async_trait]
impl ChatModel for RetryChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SummevalError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let error = match self.inner.chat(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };
            if !error.is_transient() || attempt >= max_attempts {
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                cause = transient_cause(&error),
                ?delay,
                "judge call failed, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
