//! Multi-agent orchestration engine: planning, scheduling, aggregation and validation.
//!
//! A natural-language command is decomposed into a dependency-annotated task
//! graph, the graph is executed level by level with every ready task of a
//! level running concurrently, and the per-task outcomes are bucketed and
//! scored into a single validated result.
//!
//! # Main types
//!
//! - [`Orchestrator`] — Top-level engine: plan, schedule, aggregate, validate.
//! - [`Scheduler`] — Ready-set executor with deadlock detection and cancellation.
//! - [`TaskQueue`] — Task graph storage with dependency resolution and cycle detection.
//! - [`AgentRegistry`] — Role to live agent cache with lazy spawning.
//! - [`PatternPlanner`] — Default keyword/pattern decomposition policy.
//! - [`EventSink`] — Receiver of task and agent lifecycle events.

/// Result bucketing and summary.
pub mod aggregator;
/// Engine configuration.
pub mod config;
/// Orchestration engine.
pub mod engine;
/// Lifecycle events and sinks.
pub mod events;
/// Command decomposition policies.
pub mod planner;
/// Role to agent instance registry.
pub mod registry;
/// Task type to agent role routing.
pub mod router;
/// Batch scheduler.
pub mod scheduler;
/// Task graph storage and dependency resolution.
pub mod task_queue;
/// Final quality scoring of aggregated results.
pub mod validation;

pub use aggregator::{aggregate, AggregateResult, Outcome, TaskOutcome};
pub use config::OrchestratorConfig;
pub use engine::{Orchestrator, OrchestratorResult};
pub use events::{ChannelSink, EventSink, OrchestrationEvent, TracingSink};
pub use planner::{Category, PatternPlanner, TaskPlanner};
pub use registry::{AgentFactory, AgentRegistry, SharedAgent};
pub use router::RoleRouter;
pub use scheduler::{CancelOutcome, RunReport, Scheduler};
pub use task_queue::TaskQueue;
pub use validation::{validate_result, ValidatedResult, DEFAULT_QUALITY_SCORE};
