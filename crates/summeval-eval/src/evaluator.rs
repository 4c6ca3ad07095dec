use std::sync::Arc;

use async_trait::async_trait;
use summeval_core::{ChatModel, SummevalError};
use tracing::Instrument;

use crate::extract::ExtractedConversation;
use crate::judge::JudgeInvoker;
use crate::parser::{EvaluationResult, ResultParser};
use crate::prompt::{GradingPrompt, PromptBuilder};
use crate::record::ExampleRecord;
use crate::rubric::Rubric;

/// Maps one example (input conversation plus output reply) to one result.
///
/// Implementations hold no per-call state and may be invoked concurrently.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Identifier reported in every result this evaluator produces.
    fn key(&self) -> &str;

    async fn evaluate(&self, example: &ExampleRecord) -> Result<EvaluationResult, SummevalError>;
}

/// LLM-as-judge evaluator for document summaries under a single rubric.
#[derive(Clone)]
pub struct SummaryEvaluator {
    prompts: PromptBuilder,
    judge: JudgeInvoker,
    parser: ResultParser,
}

impl SummaryEvaluator {
    pub fn new(rubric: Rubric, judge: JudgeInvoker) -> Self {
        Self {
            prompts: PromptBuilder::new(rubric),
            judge,
            parser: ResultParser::new(rubric.key()),
        }
    }

    /// `summary_content_evaluator`: fidelity, structure and style.
    pub fn content(model: Arc<dyn ChatModel>) -> Self {
        Self::new(Rubric::ContentQuality, JudgeInvoker::new(model))
    }

    /// `summary_size_evaluator`: length-ratio compliance.
    pub fn size(model: Arc<dyn ChatModel>) -> Self {
        Self::new(Rubric::SizeConstraint, JudgeInvoker::new(model))
    }

    pub fn rubric(&self) -> Rubric {
        self.prompts.rubric()
    }

    /// Render the grading prompt for an example without calling the judge.
    pub fn render_prompt(&self, example: &ExampleRecord) -> Result<GradingPrompt, SummevalError> {
        let conversation = ExtractedConversation::from_record(&example.conversation()?);
        let model_output = example.model_output()?;
        self.prompts.build(&conversation, &model_output)
    }
}

#[async_trait]
impl Evaluator for SummaryEvaluator {
    fn key(&self) -> &str {
        self.parser.key()
    }

    async fn evaluate(&self, example: &ExampleRecord) -> Result<EvaluationResult, SummevalError> {
        let span = tracing::info_span!(
            "evaluate",
            key = %self.key(),
            example = example.id.as_deref().unwrap_or("-"),
        );
        async {
            let prompt = self.render_prompt(example)?;
            let raw = self.judge.invoke(&prompt).await?;
            let result = self.parser.parse(&raw);
            tracing::debug!(score = result.score, "example graded");
            Ok::<_, SummevalError>(result)
        }
        .instrument(span)
        .await
    }
}

/// One evaluator per rubric, all sharing the same judge.
pub fn summary_evaluators(judge: JudgeInvoker) -> Vec<Arc<dyn Evaluator>> {
    evaluators_for(&Rubric::ALL, judge)
}

/// Evaluators for the given rubrics in first-seen order. A rubric listed
/// twice yields a single evaluator.
pub fn evaluators_for(rubrics: &[Rubric], judge: JudgeInvoker) -> Vec<Arc<dyn Evaluator>> {
    let mut seen = Vec::with_capacity(rubrics.len());
    for rubric in rubrics {
        if !seen.contains(rubric) {
            seen.push(*rubric);
        }
    }
    seen.into_iter()
        .map(|rubric| {
            Arc::new(SummaryEvaluator::new(rubric, judge.clone())) as Arc<dyn Evaluator>
        })
        .collect()
}
