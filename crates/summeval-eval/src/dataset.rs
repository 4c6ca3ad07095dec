use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use summeval_core::SummevalError;

use crate::evaluator::Evaluator;
use crate::parser::EvaluationResult;
use crate::record::ExampleRecord;

/// A named collection of examples to grade.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub examples: Vec<ExampleRecord>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, examples: Vec<ExampleRecord>) -> Self {
        Self {
            name: name.into(),
            examples,
        }
    }

    /// Parse one [`ExampleRecord`] per non-blank line.
    pub fn from_jsonl_str(name: impl Into<String>, text: &str) -> Result<Self, SummevalError> {
        let examples = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<ExampleRecord>(line).map_err(|e| {
                    SummevalError::Validation(format!("line {}: invalid example: {e}", i + 1))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, examples))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SummevalError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            SummevalError::Config(format!("failed to read dataset {}: {e}", path.display()))
        })?;
        Self::from_jsonl_str(path.display().to_string(), &text)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Settings for one experiment run. The dataset identifier and prefix are
/// carried through to the report without interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub dataset: String,
    pub experiment_prefix: String,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    8
}

impl ExperimentConfig {
    pub fn new(dataset: impl Into<String>, experiment_prefix: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            experiment_prefix: experiment_prefix.into(),
            max_concurrency: default_max_concurrency(),
        }
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// `"{prefix}-{8 hex chars}"`, unique per call.
    pub fn experiment_name(&self) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.experiment_prefix, &id[..8])
    }
}

/// An evaluator that returned an error instead of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorFailure {
    pub key: String,
    pub error: String,
}

/// All results for one example, in evaluator order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleOutcome {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_id: Option<String>,
    pub results: Vec<EvaluationResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<EvaluatorFailure>,
}

/// Aggregate over all examples for one evaluator key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorSummary {
    pub key: String,
    pub evaluated: usize,
    pub failed: usize,
    pub parse_failures: usize,
    /// Mean score over evaluated examples; 0.0 if none.
    pub mean_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub experiment_name: String,
    pub dataset: String,
    pub outcomes: Vec<ExampleOutcome>,
}

impl ExperimentReport {
    pub fn summary(&self) -> Vec<EvaluatorSummary> {
        let mut by_key: BTreeMap<&str, (Vec<f64>, usize, usize)> = BTreeMap::new();
        for outcome in &self.outcomes {
            for result in &outcome.results {
                let entry = by_key.entry(result.key.as_str()).or_default();
                entry.0.push(result.score);
                if result.is_parse_failure() {
                    entry.2 += 1;
                }
            }
            for failure in &outcome.failures {
                by_key.entry(failure.key.as_str()).or_default().1 += 1;
            }
        }

        by_key
            .into_iter()
            .map(|(key, (scores, failed, parse_failures))| {
                let mean_score = if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                };
                EvaluatorSummary {
                    key: key.to_string(),
                    evaluated: scores.len(),
                    failed,
                    parse_failures,
                    mean_score,
                }
            })
            .collect()
    }
}

/// Grade every example with every evaluator.
///
/// At most `config.max_concurrency` evaluations are in flight. An evaluator
/// error is recorded against its example and does not stop the run.
pub async fn run_experiment(
    config: &ExperimentConfig,
    dataset: &Dataset,
    evaluators: &[Arc<dyn Evaluator>],
) -> ExperimentReport {
    let experiment_name = config.experiment_name();
    tracing::info!(
        experiment = %experiment_name,
        dataset = %config.dataset,
        examples = dataset.len(),
        evaluators = evaluators.len(),
        "experiment started"
    );

    let jobs = dataset.examples.iter().enumerate().flat_map(move |(index, example)| {
        evaluators
            .iter()
            .enumerate()
            .map(move |(slot, evaluator)| (index, slot, example, evaluator.clone()))
    });

    let finished: Vec<_> = stream::iter(jobs)
        .map(|(index, slot, example, evaluator)| async move {
            let outcome = evaluator.evaluate(example).await;
            (index, slot, evaluator.key().to_string(), outcome)
        })
        .buffer_unordered(config.max_concurrency.max(1))
        .collect()
        .await;

    let mut slots: Vec<Vec<Option<(String, Result<EvaluationResult, SummevalError>)>>> = dataset
        .examples
        .iter()
        .map(|_| evaluators.iter().map(|_| None).collect())
        .collect();
    for (index, slot, key, outcome) in finished {
        slots[index][slot] = Some((key, outcome));
    }

    let outcomes: Vec<ExampleOutcome> = slots
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let mut results = Vec::new();
            let mut failures = Vec::new();
            for (key, outcome) in row.into_iter().flatten() {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        tracing::warn!(index, key = %key, error = %e, "evaluation failed");
                        failures.push(EvaluatorFailure {
                            key,
                            error: e.to_string(),
                        });
                    }
                }
            }
            ExampleOutcome {
                index,
                example_id: dataset.examples[index].id.clone(),
                results,
                failures,
            }
        })
        .collect();

    let failed = outcomes.iter().map(|o| o.failures.len()).sum::<usize>();
    tracing::info!(experiment = %experiment_name, failed, "experiment finished");

    ExperimentReport {
        experiment_name,
        dataset: config.dataset.clone(),
        outcomes,
    }
}
