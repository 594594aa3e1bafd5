use crate::aggregator::AggregateResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Quality score used when no validation result was aggregated.
pub const DEFAULT_QUALITY_SCORE: f64 = 0.8;

/// An aggregate with its final quality verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedResult {
    #[serde(flatten)]
    pub aggregate: AggregateResult,
    pub quality_score: f64,
    pub validation_passed: bool,
}

/// Attach a quality verdict to `aggregate`.
///
/// The first validation entry supplies `score` and `passed`, defaulting to
/// `0.0` and `false` when those fields are absent. With no validation entry
/// the result is scored [`DEFAULT_QUALITY_SCORE`] and passes.
pub fn validate_result(aggregate: AggregateResult) -> ValidatedResult {
    let (quality_score, validation_passed) = match aggregate.validation.first() {
        Some(report) => (
            report.get("score").and_then(Value::as_f64).unwrap_or(0.0),
            report.get("passed").and_then(Value::as_bool).unwrap_or(false),
        ),
        None => (DEFAULT_QUALITY_SCORE, true),
    };
    ValidatedResult {
        aggregate,
        quality_score,
        validation_passed,
    }
}
