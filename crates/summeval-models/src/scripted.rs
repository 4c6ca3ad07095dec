use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use summeval_core::{ChatModel, ChatRequest, ChatResponse, SummevalError};
use tokio::sync::Mutex;

/// A judge model that replays queued responses in order and records the
/// requests it was given.
#[derive(Clone)]
pub struct ScriptedChatModel {
    responses: Arc<Mutex<VecDeque<Result<ChatResponse, SummevalError>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedChatModel {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Script that can also fail, e.g. to simulate an upstream outage.
    pub fn with_results(results: Vec<Result<ChatResponse, SummevalError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(results))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience for a script of plain AI text replies.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(ChatResponse::text).collect())
    }

    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SummevalError> {
        self.requests.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        responses.pop_front().unwrap_or_else(|| {
            Err(SummevalError::Model(
                "scripted model exhausted responses".to_string(),
            ))
        })
    }
}
