use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Overall score needed for a validation report to pass.
pub const PASS_THRESHOLD: f64 = 0.7;
/// Below this score a failing criterion is reported as high severity.
pub const HIGH_SEVERITY_BELOW: f64 = 0.5;

/// Criteria run when a validation task names none.
pub const DEFAULT_CRITERIA: &str = "quality,accuracy,completeness";

const COMPLETENESS_FIELDS: [&str; 5] = ["results", "summary", "data", "analysis", "code"];

/// A named quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Quality,
    Accuracy,
    Completeness,
    Performance,
    Security,
    Reliability,
}

impl Criterion {
    /// Resolve a criterion name. Unknown names are checked as quality.
    pub fn resolve(name: &str) -> Self {
        match name {
            "accuracy" => Self::Accuracy,
            "completeness" => Self::Completeness,
            "performance" => Self::Performance,
            "security" => Self::Security,
            "reliability" => Self::Reliability,
            _ => Self::Quality,
        }
    }

    /// Whether `name` is one of the built-in criteria.
    pub fn is_known(name: &str) -> bool {
        matches!(
            name,
            "quality" | "accuracy" | "completeness" | "performance" | "security" | "reliability"
        )
    }

    fn recommendation(self) -> &'static str {
        match self {
            Self::Quality => "Improve code quality through refactoring and documentation",
            Self::Accuracy => "Verify data sources and increase validation steps",
            Self::Completeness => "Add missing fields and ensure comprehensive coverage",
            Self::Performance => "Optimize algorithms and reduce resource usage",
            Self::Security => "Address security vulnerabilities and add safety checks",
            Self::Reliability => "Improve error handling and add retry mechanisms",
        }
    }
}

/// Pass or fail verdict for one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    fn at_least(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// Outcome of a single criterion check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    /// Always within `[0, 1]`.
    pub score: f64,
    pub status: CheckStatus,
    pub details: String,
}

/// How urgently a failing criterion needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
}

/// A failing criterion surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub criterion: String,
    pub severity: Severity,
    pub message: String,
    pub details: String,
}

/// Combined result of running a set of criteria.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub score: f64,
    /// Keyed by the criterion name as requested.
    pub criteria_results: Map<String, Value>,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
}

/// Runs named criteria against a JSON payload and combines the scores.
#[derive(Debug, Clone)]
pub struct CriterionValidator {
    threshold: f64,
}

impl Default for CriterionValidator {
    fn default() -> Self {
        Self {
            threshold: PASS_THRESHOLD,
        }
    }
}

impl CriterionValidator {
    /// A validator with every built-in criterion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a comma separated criteria list, dropping blanks and repeats.
    pub fn parse_criteria(spec: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Run one criterion.
    pub fn check(&self, criterion: Criterion, data: &Value) -> CriterionResult {
        let fields = data.as_object();
        match criterion {
            Criterion::Quality => {
                let mut score: f64 = 0.85;
                if let Some(obj) = fields {
                    if obj.contains_key("code") || obj.contains_key("results") {
                        score += 0.05;
                    }
                    if obj.contains_key("documentation") || obj.contains_key("synthesis") {
                        score += 0.05;
                    }
                }
                let score = score.min(1.0);
                let status = CheckStatus::at_least(score, 0.7);
                CriterionResult {
                    score,
                    status,
                    details: match status {
                        CheckStatus::Pass => "Quality standards met".to_string(),
                        CheckStatus::Fail => "Quality issues found".to_string(),
                    },
                }
            }
            Criterion::Accuracy => {
                let score = fields
                    .and_then(|obj| {
                        obj.get("confidence_score")
                            .or_else(|| obj.get("quality_score"))
                            .and_then(Value::as_f64)
                    })
                    .unwrap_or(0.80)
                    .clamp(0.0, 1.0);
                CriterionResult {
                    score,
                    status: CheckStatus::at_least(score, 0.7),
                    details: format!("Accuracy score: {score:.2}"),
                }
            }
            Criterion::Completeness => {
                let score = match fields {
                    Some(obj) => {
                        let present = COMPLETENESS_FIELDS
                            .iter()
                            .filter(|f| obj.contains_key(**f))
                            .count();
                        present as f64 / COMPLETENESS_FIELDS.len() as f64
                    }
                    None => 0.75,
                };
                CriterionResult {
                    score,
                    status: CheckStatus::at_least(score, 0.5),
                    details: format!("Completeness: {:.0}%", score * 100.0),
                }
            }
            Criterion::Performance => CriterionResult {
                score: 0.85,
                status: CheckStatus::Pass,
                details: "Performance within acceptable limits".to_string(),
            },
            Criterion::Security => CriterionResult {
                score: 0.90,
                status: CheckStatus::Pass,
                details: "No security vulnerabilities detected".to_string(),
            },
            Criterion::Reliability => {
                let mut score: f64 = 0.82;
                if let Some(obj) = fields {
                    if obj.contains_key("error") {
                        score -= 0.3;
                    }
                    if obj.get("validation_passed").and_then(Value::as_bool) == Some(false) {
                        score -= 0.2;
                    }
                }
                let score = score.max(0.0);
                CriterionResult {
                    score,
                    status: CheckStatus::at_least(score, 0.7),
                    details: "Reliability assessment complete".to_string(),
                }
            }
        }
    }

    /// Run every named criterion and combine them into a report.
    ///
    /// The overall score is the mean of all criterion scores; an empty
    /// criteria list scores 0 and fails.
    pub fn validate(&self, criteria: &[String], data: &Value) -> ValidationReport {
        let results: Vec<(&str, Criterion, CriterionResult)> = criteria
            .iter()
            .map(|name| {
                let criterion = Criterion::resolve(name);
                (name.as_str(), criterion, self.check(criterion, data))
            })
            .collect();

        let score = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|(_, _, r)| r.score).sum::<f64>() / results.len() as f64
        };

        let issues: Vec<Issue> = results
            .iter()
            .filter(|(_, _, r)| r.status == CheckStatus::Fail)
            .map(|(name, _, r)| Issue {
                criterion: (*name).to_string(),
                severity: if r.score < HIGH_SEVERITY_BELOW {
                    Severity::High
                } else {
                    Severity::Medium
                },
                message: format!("{} check failed", title_case(name)),
                details: r.details.clone(),
            })
            .collect();

        let mut recommendations: Vec<String> = results
            .iter()
            .filter(|(name, _, r)| r.score < self.threshold && Criterion::is_known(name))
            .map(|(_, criterion, _)| criterion.recommendation().to_string())
            .collect();
        if recommendations.is_empty() {
            recommendations
                .push("All validation criteria passed - maintain current standards".to_string());
        }

        let criteria_results = results
            .into_iter()
            .map(|(name, _, r)| {
                let value = serde_json::to_value(&r).unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect();

        ValidationReport {
            passed: score >= self.threshold,
            score,
            criteria_results,
            issues,
            recommendations,
        }
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
