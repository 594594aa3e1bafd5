//! Core types and error definitions for the maestro orchestration engine.
//!
//! This crate provides the foundational types shared across all maestro crates:
//! the unified error enum and the [`Task`] data model that flows between the
//! planner, the scheduler and the agents.
//!
//! # Main types
//!
//! - [`MaestroError`] — Unified error enum for all maestro subsystems.
//! - [`MaestroResult`] — Convenience alias for `Result<T, MaestroError>`.
//! - [`Task`] — A unit of work with a type tag, dependencies and a terminal status.
//! - [`TaskId`] — Opaque unique task identifier.
//! - [`TaskStatus`] — Task lifecycle state machine.

/// Task data model and lifecycle transitions.
pub mod task;

pub use task::{Task, TaskId, TaskStatus};

// --- Error types ---

/// Top-level error type for the maestro engine.
///
/// Task-level variants ([`MaestroError::ValidationRejected`],
/// [`MaestroError::Execution`], [`MaestroError::UnknownRole`],
/// [`MaestroError::Timeout`]) are recovered into a failed task by the
/// scheduler. Only graph-level variants reach the caller of a run.
#[derive(Debug, thiserror::Error)]
pub enum MaestroError {
    /// An agent declined a task because of its type.
    #[error("Agent {agent} cannot handle task type {task_type}")]
    ValidationRejected {
        /// Display name of the agent that declined.
        agent: String,
        /// The rejected task type.
        task_type: String,
    },

    /// An agent's domain logic failed while executing a task.
    #[error("Execution error: {0}")]
    Execution(String),

    /// A task type maps to no role, or a role has no registered agent.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// No task is ready while unfinished tasks remain.
    #[error("Graph deadlock: {remaining} task(s) can never become ready")]
    GraphDeadlock {
        /// Number of tasks left unfinished when the deadlock was detected.
        remaining: usize,
    },

    /// A submitted task graph is structurally invalid.
    #[error("Invalid task graph: {0}")]
    InvalidGraph(String),

    /// A task exceeded its execution time budget.
    #[error("Task timed out after {0}s")]
    Timeout(u64),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`MaestroError`].
pub type MaestroResult<T> = Result<T, MaestroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rejected_display() {
        let err = MaestroError::ValidationRejected {
            agent: "Code Specialist".to_string(),
            task_type: "research".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Agent Code Specialist cannot handle task type research"
        );
    }

    #[test]
    fn test_deadlock_display() {
        let err = MaestroError::GraphDeadlock { remaining: 2 };
        assert!(err.to_string().contains("2 task(s)"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: MaestroError = parse.unwrap_err().into();
        assert!(matches!(err, MaestroError::Json(_)));
    }
}
