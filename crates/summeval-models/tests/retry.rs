use std::sync::Arc;
use std::time::Duration;

use summeval_core::{ChatModel, ChatRequest, ChatResponse, Message, SummevalError};
use summeval_models::{RetryChatModel, RetryPolicy, ScriptedChatModel};

fn fast_policy(max_attempts: usize) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

fn request() -> ChatRequest {
    ChatRequest::new(vec![Message::human("grade this")])
}

#[tokio::test]
async fn retries_on_rate_limit() {
    let inner = Arc::new(ScriptedChatModel::with_results(vec![
        Err(SummevalError::RateLimit("rate limited".into())),
        Err(SummevalError::RateLimit("rate limited".into())),
        Ok(ChatResponse::text("success")),
    ]));
    let model = RetryChatModel::new(inner.clone(), fast_policy(3));

    let response = model.chat(request()).await.unwrap();
    assert_eq!(response.message.content(), "success");
    assert_eq!(inner.requests().await.len(), 3);
}

#[tokio::test]
async fn retries_on_timeout() {
    let inner = Arc::new(ScriptedChatModel::with_results(vec![
        Err(SummevalError::Timeout("timed out".into())),
        Ok(ChatResponse::text("success")),
    ]));
    let model = RetryChatModel::new(inner.clone(), fast_policy(3));

    let response = model.chat(request()).await.unwrap();
    assert_eq!(response.message.content(), "success");
    assert_eq!(inner.requests().await.len(), 2);
}

#[tokio::test]
async fn does_not_retry_model_error() {
    let inner = Arc::new(ScriptedChatModel::with_results(vec![
        Err(SummevalError::Model("bad request".into())),
        Ok(ChatResponse::text("never reached")),
    ]));
    let model = RetryChatModel::new(inner.clone(), fast_policy(3));

    let err = model.chat(request()).await.unwrap_err();
    assert!(matches!(err, SummevalError::Model(_)));
    assert_eq!(inner.requests().await.len(), 1);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let inner = Arc::new(ScriptedChatModel::with_results(vec![
        Err(SummevalError::RateLimit("1".into())),
        Err(SummevalError::RateLimit("2".into())),
        Ok(ChatResponse::text("too late")),
    ]));
    let model = RetryChatModel::new(inner.clone(), fast_policy(2));

    let err = model.chat(request()).await.unwrap_err();
    assert!(matches!(err, SummevalError::RateLimit(ref msg) if msg == "2"));
    assert_eq!(inner.requests().await.len(), 2);
}

#[tokio::test]
async fn zero_attempts_still_calls_once() {
    let inner = Arc::new(ScriptedChatModel::with_results(vec![Err(
        SummevalError::Timeout("slow judge".into()),
    )]));
    let model = RetryChatModel::new(inner.clone(), fast_policy(0));

    let err = model.chat(request()).await.unwrap_err();
    assert!(matches!(err, SummevalError::Timeout(_)));
    assert_eq!(inner.requests().await.len(), 1);
}

#[test]
fn backoff_doubles_up_to_the_cap() {
    let policy = RetryPolicy {
        max_attempts: 10,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(500),
    };
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    assert_eq!(policy.delay_for(4), Duration::from_millis(500));
    assert_eq!(policy.delay_for(60), Duration::from_millis(500));
}

#[test]
fn default_policy_allows_three_attempts() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.delay_for(1), Duration::from_millis(500));
    assert!(policy.delay_for(20) <= policy.max_delay);
}
