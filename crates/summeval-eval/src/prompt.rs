use std::fmt;

use summeval_core::SummevalError;

use crate::extract::ExtractedConversation;
use crate::rubric::Rubric;

/// Fully rendered grading prompt, sent to the judge as the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingPrompt(String);

impl GradingPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GradingPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const TASK_PREAMBLE: &str = "Based on the above information, evaluate the model's ability to summarize a document that was provided to it as an input.";

const RESPONSE_FORMAT: &str = r#"Respond with exactly one JSON object in the following format and nothing else:
{
    "score": <int>,
    "explanation": "<string>"
}"#;

/// Renders rubric-specific grading prompts. Rendering is deterministic.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    rubric: Rubric,
}

impl PromptBuilder {
    pub fn new(rubric: Rubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> Rubric {
        self.rubric
    }

    pub fn build(
        &self,
        conversation: &ExtractedConversation,
        model_output: &str,
    ) -> Result<GradingPrompt, SummevalError> {
        let history = serde_json::to_string_pretty(conversation.turns())
            .map_err(|e| SummevalError::Parsing(format!("failed to serialize turns: {e}")))?;

        let mut out = format!(
            "System Prompt: {}\n\nMessage History:\n{}\n\nLatest User Message: {}\n\nModel Output: {}\n\n{}\n",
            conversation.system_prompt(),
            history,
            conversation.latest_user_message(),
            model_output,
            TASK_PREAMBLE,
        );
        for criterion in self.rubric.criteria() {
            out.push_str(criterion);
            out.push('\n');
        }
        out.push_str("Also provide a brief explanation for your score.\n\n");

        out.push_str("Here is the scale you should use to build your answer:\n");
        for (score, description) in self.rubric.anchors() {
            out.push_str(&format!("{score}: {description}\n"));
        }
        out.push('\n');
        out.push_str(RESPONSE_FORMAT);
        out.push('\n');

        Ok(GradingPrompt(out))
    }
}
