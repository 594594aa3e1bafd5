use maestro_core::{Task, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a task ended, as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

/// A task id paired with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub outcome: Outcome,
}

impl TaskOutcome {
    /// Outcome of a task that produced a value.
    pub fn success(task_id: impl Into<TaskId>, value: Value) -> Self {
        Self {
            task_id: task_id.into(),
            outcome: Outcome::Success(value),
        }
    }

    /// Outcome of a task that failed.
    pub fn failure(task_id: impl Into<TaskId>, error: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            outcome: Outcome::Failure(error.into()),
        }
    }

    /// Completed tasks become successes; everything else is a failure.
    pub fn from_task(task: &Task) -> Self {
        let outcome = match task.status {
            TaskStatus::Completed => Outcome::Success(task.result.clone().unwrap_or(Value::Null)),
            TaskStatus::Failed => {
                Outcome::Failure(task.error.clone().unwrap_or_else(|| "failed".to_string()))
            }
            TaskStatus::Cancelled => Outcome::Failure("cancelled".to_string()),
            TaskStatus::Idle | TaskStatus::Executing => {
                Outcome::Failure(format!("task ended while {}", task.status))
            }
        };
        Self {
            task_id: task.id.clone(),
            outcome,
        }
    }

    /// True when the outcome carries no error.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// Successful results grouped by kind, with a one-line summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub research: Vec<Value>,
    pub code: Vec<Value>,
    pub analysis: Vec<Value>,
    pub validation: Vec<Value>,
    pub summary: String,
    pub total_tasks: usize,
    pub successful_tasks: usize,
}

#[derive(Clone, Copy)]
enum Bucket {
    Research,
    Code,
    Validation,
    Analysis,
}

/// Pick a bucket from the task id and the shape of its value.
///
/// Checked in order: an id containing "research" or a list value goes to
/// research; an id containing "code" or a string value goes to code; an id
/// containing "validate" goes to validation; anything else is analysis.
fn bucket_for(task_id: &TaskId, value: &Value) -> Bucket {
    let id = task_id.as_str();
    if id.contains("research") || value.is_array() {
        Bucket::Research
    } else if id.contains("code") || value.is_string() {
        Bucket::Code
    } else if id.contains("validate") {
        Bucket::Validation
    } else {
        Bucket::Analysis
    }
}

/// Bucket successful outcomes and count successes. Failures are counted in
/// the total only.
pub fn aggregate(outcomes: &[TaskOutcome]) -> AggregateResult {
    let mut result = AggregateResult {
        total_tasks: outcomes.len(),
        ..Default::default()
    };

    for outcome in outcomes {
        let Outcome::Success(value) = &outcome.outcome else {
            continue;
        };
        result.successful_tasks += 1;
        let bucket = match bucket_for(&outcome.task_id, value) {
            Bucket::Research => &mut result.research,
            Bucket::Code => &mut result.code,
            Bucket::Validation => &mut result.validation,
            Bucket::Analysis => &mut result.analysis,
        };
        bucket.push(value.clone());
    }

    result.summary = format!(
        "Completed {}/{} tasks successfully",
        result.successful_tasks, result.total_tasks
    );
    result
}
