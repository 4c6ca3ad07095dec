use std::sync::Arc;

use summeval_core::{ChatModel, ChatRequest, Message, SummevalError};

use crate::prompt::GradingPrompt;

pub const DEFAULT_JUDGE_INSTRUCTION: &str =
    "You are an AI assistant tasked with evaluating the outputs of a model that summarizes documents.";

/// Sampling temperature of every judge call unless overridden.
pub const DEFAULT_JUDGE_TEMPERATURE: f64 = 0.2;

/// Sends grading prompts to the judge model and returns its raw reply text.
///
/// Performs exactly one call per [`invoke`](Self::invoke). Errors from the
/// client are returned unchanged; wrap the client in a retrying model if
/// retries are wanted.
#[derive(Clone)]
pub struct JudgeInvoker {
    model: Arc<dyn ChatModel>,
    system_instruction: String,
    temperature: f64,
}

impl JudgeInvoker {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            system_instruction: DEFAULT_JUDGE_INSTRUCTION.to_string(),
            temperature: DEFAULT_JUDGE_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn request_for(&self, prompt: &GradingPrompt) -> ChatRequest {
        ChatRequest::new(vec![
            Message::system(self.system_instruction.clone()),
            Message::human(prompt.as_str()),
        ])
        .with_temperature(self.temperature)
    }

    pub async fn invoke(&self, prompt: &GradingPrompt) -> Result<String, SummevalError> {
        tracing::debug!(prompt_len = prompt.as_str().len(), "invoking judge model");
        let response = self.model.chat(self.request_for(prompt)).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "judge replied"
            );
        }
        Ok(response.message.content().to_string())
    }
}
