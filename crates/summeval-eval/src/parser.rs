use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reason reported when the judge reply cannot be interpreted.
pub const PARSE_FAILURE_REASON: &str = "Failed to parse evaluator response";

/// Normalized outcome of grading one example with one rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Evaluator identifier.
    pub key: String,
    /// Score between 0.0 and 1.0.
    pub score: f64,
    pub reason: String,
}

impl EvaluationResult {
    pub fn new(key: impl Into<String>, score: f64, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            score,
            reason: reason.into(),
        }
    }

    /// Zero-score result used when the judge reply is unusable.
    pub fn parse_failure(key: impl Into<String>) -> Self {
        Self::new(key, 0.0, PARSE_FAILURE_REASON)
    }

    pub fn is_parse_failure(&self) -> bool {
        self.score == 0.0 && self.reason == PARSE_FAILURE_REASON
    }
}

#[derive(Debug, Deserialize)]
struct JudgeVerdict {
    score: f64,
    explanation: String,
}

/// Turns raw judge text into an [`EvaluationResult`]. Never fails: any reply
/// that is not a JSON object with a numeric `score` and a string
/// `explanation` yields [`EvaluationResult::parse_failure`].
#[derive(Debug, Clone)]
pub struct ResultParser {
    key: String,
}

impl ResultParser {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parse(&self, raw: &str) -> EvaluationResult {
        match read_verdict(strip_code_fence(raw)) {
            Ok(verdict) => EvaluationResult::new(
                self.key.clone(),
                normalize_score(verdict.score),
                verdict.explanation,
            ),
            Err(reason) => {
                tracing::warn!(key = %self.key, %reason, raw_len = raw.len(), "unparseable judge response");
                EvaluationResult::parse_failure(self.key.clone())
            }
        }
    }
}

/// Derived struct deserializers also accept a positional array, so the
/// object shape is checked on the untyped value first.
fn read_verdict(text: &str) -> Result<JudgeVerdict, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Map a 1-10 judge score onto `[0.0, 1.0]`.
pub fn normalize_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    (score / 10.0).clamp(0.0, 1.0)
}

/// Remove one surrounding Markdown code fence (```json ... ```), if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with('{') => inner.trim(),
        _ => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fence_with_info_string() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```{}```"), "{}");
    }

    #[test]
    fn leaves_unfenced_and_unterminated_text() {
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"score\": 7,"), "```json\n{\"score\": 7,");
    }

    #[test]
    fn normalize_clamps_out_of_range() {
        assert_eq!(normalize_score(10.0), 1.0);
        assert_eq!(normalize_score(11.0), 1.0);
        assert_eq!(normalize_score(-3.0), 0.0);
        assert_eq!(normalize_score(f64::NAN), 0.0);
        assert!((normalize_score(7.0) - 0.7).abs() < 1e-9);
    }
}
