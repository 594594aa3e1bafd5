use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Highest accepted task priority.
pub const MAX_PRIORITY: u8 = 10;

/// Opaque unique identifier of a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh identifier of the form `task_<12 hex chars>`.
    pub fn new() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("task_{}", &hex[..12]))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle state of a task.
///
/// `Idle → Executing → {Completed | Failed}`; `Cancelled` is reachable from
/// `Idle` and `Executing` by external request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting for its dependencies or for a scheduler slot.
    #[default]
    Idle,
    /// Bound to an agent and running.
    Executing,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
    /// Withdrawn before it could finish.
    Cancelled,
}

impl TaskStatus {
    /// Whether the task will never be executed again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Idle => write!(f, "idle"),
            TaskStatus::Executing => write!(f, "executing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A unit of work routed to an agent by its `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Routing tag, e.g. `research`, `code`, `validate`.
    #[serde(rename = "type")]
    pub task_type: String,
    pub description: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    /// 0–10, higher is more urgent. Only a tie-break hint.
    #[serde(default)]
    pub priority: u8,
    /// Tasks that must be finished before this one is ready.
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Task {
    /// An idle task with a fresh id, priority 0 and no dependencies.
    pub fn new(task_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            task_type: task_type.into(),
            description: description.into(),
            params: Map::new(),
            priority: 0,
            depends_on: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            status: TaskStatus::Idle,
            result: None,
            error: None,
        }
    }

    /// Use a caller-chosen id.
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set one entry in the params object.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Priorities above [`MAX_PRIORITY`] are clamped.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(MAX_PRIORITY);
        self
    }

    /// Replace the dependency list.
    pub fn with_dependencies(mut self, deps: Vec<TaskId>) -> Self {
        self.depends_on = deps;
        self
    }

    /// String parameter lookup.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Unsigned integer parameter lookup.
    pub fn param_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(Value::as_u64)
    }

    /// Ready when still idle and every dependency is in `finished`.
    pub fn is_ready(&self, finished: &HashSet<TaskId>) -> bool {
        self.status == TaskStatus::Idle && self.depends_on.iter().all(|d| finished.contains(d))
    }

    /// True for completed, failed and cancelled tasks.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True if the task lists itself as a dependency.
    pub fn has_self_dependency(&self) -> bool {
        self.depends_on.contains(&self.id)
    }

    /// Mark the task executing and stamp `started_at`.
    pub fn mark_started(&mut self) {
        self.status = TaskStatus::Executing;
        self.started_at = Some(Utc::now());
    }

    /// Record a successful result. Clears any previous error.
    pub fn complete(&mut self, result: Value) {
        self.result = Some(result);
        self.error = None;
        self.status = TaskStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Record a failure. Clears any previous result.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.result = None;
        self.status = TaskStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Cancel the task. Returns false when it is already terminal.
    pub fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = TaskStatus::Cancelled;
        self.completed_at = Some(Utc::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("research", "Research: AI trends");
        assert_eq!(task.status, TaskStatus::Idle);
        assert!(task.depends_on.is_empty());
        assert!(task.result.is_none());
        assert!(task.error.is_none());
        assert!(task.id.as_str().starts_with("task_"));
        assert_eq!(task.id.as_str().len(), "task_".len() + 12);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("code", "a");
        let b = Task::new("code", "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_priority_is_clamped() {
        let task = Task::new("code", "x").with_priority(42);
        assert_eq!(task.priority, MAX_PRIORITY);
    }

    #[test]
    fn test_is_ready_with_deps() {
        let dep = TaskId::new();
        let task = Task::new("validate", "v").with_dependencies(vec![dep.clone()]);
        assert!(!task.is_ready(&HashSet::new()));
        assert!(task.is_ready(&HashSet::from([dep])));
    }

    #[test]
    fn test_not_ready_when_executing() {
        let mut task = Task::new("research", "r");
        task.mark_started();
        assert!(!task.is_ready(&HashSet::new()));
        assert!(task.started_at.is_some());
    }

    #[test]
    fn test_complete_and_fail_are_exclusive() {
        let mut task = Task::new("code", "c");
        task.fail("boom");
        assert_eq!(task.status, TaskStatus::Failed);
        task.complete(serde_json::json!({"ok": true}));
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.error.is_none());
        assert!(task.result.is_some());
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_cancel_only_from_non_terminal() {
        let mut task = Task::new("code", "c");
        assert!(task.cancel());
        assert_eq!(task.status, TaskStatus::Cancelled);
        assert!(!task.cancel());

        let mut done = Task::new("code", "d");
        done.complete(Value::Null);
        assert!(!done.cancel());
        assert_eq!(done.status, TaskStatus::Completed);
    }

    #[test]
    fn test_self_dependency_detected() {
        let task = Task::new("code", "loop").with_id("task_self");
        let task = task.with_dependencies(vec![TaskId::from("task_self")]);
        assert!(task.has_self_dependency());
    }

    #[test]
    fn test_type_field_serialized_as_type() {
        let task = Task::new("research", "r").with_param("query", "rust");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "research");
        assert_eq!(json["status"], "idle");
        assert_eq!(json["params"]["query"], "rust");
    }

    #[test]
    fn test_param_lookups() {
        let task = Task::new("research", "r")
            .with_param("query", "rust")
            .with_param("max_results", 3);
        assert_eq!(task.param_str("query"), Some("rust"));
        assert_eq!(task.param_u64("max_results"), Some(3));
        assert_eq!(task.param_str("missing"), None);
    }
}
