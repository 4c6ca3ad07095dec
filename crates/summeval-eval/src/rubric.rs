use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use summeval_core::SummevalError;

pub const CONTENT_EVALUATOR_KEY: &str = "summary_content_evaluator";
pub const SIZE_EVALUATOR_KEY: &str = "summary_size_evaluator";

const CONTENT_CRITERIA: &[&str] = &[
    "The summary should be in simple wording and should be of a level that a middle school student will be able to follow.",
    "The summary should be concise and should capture the main ideas of the document.",
    "The summary should be accurate and true to the source material.",
    "The summary should be comprehensive and should capture all the important details of the document.",
    "The summary should be well-structured and should be easy to understand.",
    "The model should not use the same words and phrases repeatedly.",
    "The model should not start multiple paragraphs with the same words.",
    "The model should do only document summaries and should refuse to do other tasks.",
    "If the input is not a document, the model should indicate that it is not a document and should not summarize it.",
    "If the input is in a different language, the model should translate the document to English and then summarize it ensuring that the summary adheres to all the rules and guidelines already mentioned.",
];

const CONTENT_ANCHORS: &[(u8, &str)] = &[
    (1, "The model's summary is terrible: the summary is incorrect and has information that is not present in the original document."),
    (4, "The model's summary is mostly not helpful: the summary does not capture the main ideas of the document and does not provide any important details or does not adhere to the rules and guidelines mentioned."),
    (8, "The model's summary is mostly helpful: the summary captures the main ideas of the document and provides some important details but is not comprehensive and misses out some details."),
    (10, "The model's summary is excellent: the summary captures the main ideas of the document and provides all the important details while being concise and accurate."),
];

const SIZE_CRITERIA: &[&str] = &[
    "The summary should be concise and should capture the main ideas of the document.",
    "The summary should be accurate and true to the source material.",
    "The summary should not be more than 50% of the size of the original document.",
    "If the input is not a document, the model should indicate that it is not a document and should not summarize it.",
    "If the input is in a different language, the model should translate the document to English and then summarize it ensuring that the summary adheres to all the rules and guidelines already mentioned.",
];

const SIZE_ANCHORS: &[(u8, &str)] = &[
    (1, "The model's summary is terrible: the summary is empty or has garbage information."),
    (4, "The model's summary is mostly not helpful: the summary is not concise and its size is more than 50% of the original document."),
    (8, "The model's summary is mostly helpful: the summary's size is less than 50% of the original document but it misses out on some important details."),
    (10, "The model's summary is excellent: the summary captures the main ideas of the document and provides all the important details while being concise and accurate and its size is less than 50% of the original document."),
];

/// Scoring policy applied by the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rubric {
    /// Fidelity, structure and style of the summary.
    ContentQuality,
    /// Strict compliance with the summary length ratio.
    SizeConstraint,
}

impl Rubric {
    pub const ALL: [Rubric; 2] = [Rubric::ContentQuality, Rubric::SizeConstraint];

    /// Identifier reported as `EvaluationResult::key`.
    pub fn key(&self) -> &'static str {
        match self {
            Rubric::ContentQuality => CONTENT_EVALUATOR_KEY,
            Rubric::SizeConstraint => SIZE_EVALUATOR_KEY,
        }
    }

    pub fn criteria(&self) -> &'static [&'static str] {
        match self {
            Rubric::ContentQuality => CONTENT_CRITERIA,
            Rubric::SizeConstraint => SIZE_CRITERIA,
        }
    }

    /// Calibration points of the 1-10 scale, ascending.
    pub fn anchors(&self) -> &'static [(u8, &'static str)] {
        match self {
            Rubric::ContentQuality => CONTENT_ANCHORS,
            Rubric::SizeConstraint => SIZE_ANCHORS,
        }
    }
}

impl fmt::Display for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rubric::ContentQuality => f.write_str("content"),
            Rubric::SizeConstraint => f.write_str("size"),
        }
    }
}

impl FromStr for Rubric {
    type Err = SummevalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" | "content_quality" | CONTENT_EVALUATOR_KEY => Ok(Rubric::ContentQuality),
            "size" | "size_constraint" | SIZE_EVALUATOR_KEY => Ok(Rubric::SizeConstraint),
            other => Err(SummevalError::Config(format!(
                "unknown rubric {other:?}, expected `content` or `size`"
            ))),
        }
    }
}
