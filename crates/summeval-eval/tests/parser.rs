use summeval_eval::{EvaluationResult, ResultParser, PARSE_FAILURE_REASON};

fn parser() -> ResultParser {
    ResultParser::new("summary_content_evaluator")
}

#[test]
fn parses_and_normalizes_score() {
    let result = parser().parse(r#"{"score": 8, "explanation": "ok"}"#);
    assert_eq!(result.key, "summary_content_evaluator");
    assert!((result.score - 0.8).abs() < 1e-9);
    assert_eq!(result.reason, "ok");
}

#[test]
fn top_score_saturates_at_one() {
    let result = parser().parse(r#"{"score": 10, "explanation": "great"}"#);
    assert_eq!(result.score, 1.0);
}

#[test]
fn lowest_anchor_maps_to_one_tenth() {
    let result = parser().parse(r#"{"score": 1, "explanation": "garbage"}"#);
    assert!((result.score - 0.1).abs() < 1e-9);
}

#[test]
fn scores_above_ten_are_clamped() {
    let result = parser().parse(r#"{"score": 12, "explanation": "overjoyed"}"#);
    assert_eq!(result.score, 1.0);
    assert_eq!(result.reason, "overjoyed");
}

#[test]
fn invalid_json_falls_back() {
    let result = parser().parse("not json");
    assert_eq!(result, EvaluationResult::parse_failure("summary_content_evaluator"));
    assert_eq!(result.score, 0.0);
    assert_eq!(result.reason, PARSE_FAILURE_REASON);
    assert!(result.is_parse_failure());
}

#[test]
fn truncated_json_falls_back() {
    let result = parser().parse(r#"{"score": 7,"#);
    assert!(result.is_parse_failure());
}

#[test]
fn missing_fields_fall_back() {
    assert!(parser().parse(r#"{"score": 8}"#).is_parse_failure());
    assert!(parser().parse(r#"{"explanation": "no score"}"#).is_parse_failure());
}

#[test]
fn wrongly_typed_fields_fall_back() {
    assert!(parser()
        .parse(r#"{"score": "eight", "explanation": "ok"}"#)
        .is_parse_failure());
    assert!(parser().parse(r#"{"score": 8, "explanation": 3}"#).is_parse_failure());
}

#[test]
fn non_object_json_falls_back() {
    assert!(parser().parse(r#"[8, "ok"]"#).is_parse_failure());
    assert!(parser().parse("```json\n[10, \"great\"]\n```").is_parse_failure());
    assert!(parser().parse("8").is_parse_failure());
    assert!(parser().parse(r#""score: 8""#).is_parse_failure());
    assert!(parser().parse("null").is_parse_failure());
}

#[test]
fn fenced_json_is_accepted() {
    let raw = "```json\n{\"score\": 4, \"explanation\": \"too long\"}\n```";
    let result = parser().parse(raw);
    assert!((result.score - 0.4).abs() < 1e-9);
    assert_eq!(result.reason, "too long");
}

#[test]
fn extra_fields_are_ignored() {
    let result = parser().parse(r#"{"score": 6, "explanation": "fine", "confidence": 0.9}"#);
    assert!((result.score - 0.6).abs() < 1e-9);
}
