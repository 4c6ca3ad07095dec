mod dataset;
mod evaluator;
mod extract;
mod judge;
mod parser;
mod prompt;
mod record;
mod rubric;

pub use dataset::{
    run_experiment, Dataset, EvaluatorFailure, EvaluatorSummary, ExampleOutcome,
    ExperimentConfig, ExperimentReport,
};
pub use evaluator::{evaluators_for, summary_evaluators, Evaluator, SummaryEvaluator};
pub use extract::{extract_conversation, ExtractedConversation, Turn, TurnRole};
pub use judge::{JudgeInvoker, DEFAULT_JUDGE_INSTRUCTION, DEFAULT_JUDGE_TEMPERATURE};
pub use parser::{normalize_score, EvaluationResult, ResultParser, PARSE_FAILURE_REASON};
pub use prompt::{GradingPrompt, PromptBuilder};
pub use record::{ConversationRecord, EntryKind, ExampleRecord, MalformedRecordError, RecordEntry};
pub use rubric::{Rubric, CONTENT_EVALUATOR_KEY, SIZE_EVALUATOR_KEY};
