//! summeval: scores document summaries by asking a judge model.
//!
//! This crate re-exports the summeval sub-crates for single-import usage.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `openai` |
//! | `model-utils` | `ProviderBackend`, `ScriptedChatModel`, `RetryChatModel` |
//! | `openai` | OpenAI-compatible judge client |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use summeval::eval::{Evaluator, SummaryEvaluator};
//! use summeval::models::HttpBackend;
//! use summeval::openai::{OpenAiChatModel, OpenAiConfig};
//!
//! let judge = Arc::new(OpenAiChatModel::new(
//!     OpenAiConfig::new(api_key, "gpt-4o-mini"),
//!     Arc::new(HttpBackend::new()),
//! ));
//! let result = SummaryEvaluator::content(judge).evaluate(&example).await?;
//! ```

/// Core traits and types: ChatModel, Message, SummevalError.
/// Always available.
pub use summeval_core as core;

/// Evaluators, grading prompts, result parsing and the local experiment runner.
/// Always available.
pub use summeval_eval as eval;

/// ProviderBackend abstraction, ScriptedChatModel and RetryChatModel.
#[cfg(feature = "model-utils")]
pub use summeval_models as models;

/// OpenAI-compatible chat completions judge client.
#[cfg(feature = "openai")]
pub use summeval_openai as openai;
