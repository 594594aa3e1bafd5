use crate::aggregator::{aggregate, TaskOutcome};
use crate::config::OrchestratorConfig;
use crate::events::{EventSink, OrchestrationEvent, TracingSink};
use crate::planner::{PatternPlanner, TaskPlanner};
use crate::registry::AgentRegistry;
use crate::router::RoleRouter;
use crate::scheduler::Scheduler;
use crate::validation::{validate_result, ValidatedResult};
use maestro_agent::AgentSummary;
use maestro_core::{MaestroResult, Task};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Everything produced by processing one root task.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorResult {
    /// The root task, completed with the validated result.
    pub root: Task,
    /// The generated subtasks in their terminal states.
    pub subtasks: Vec<Task>,
    pub result: ValidatedResult,
    /// True when part of the graph could never become ready.
    pub deadlocked: bool,
    pub batches: usize,
}

/// Plans, schedules, aggregates and validates.
///
/// One orchestrator can process many commands. Agents spawned while
/// processing one command are reused by later ones until [`cleanup`]
/// is called.
///
/// [`cleanup`]: Orchestrator::cleanup
pub struct Orchestrator {
    planner: Arc<dyn TaskPlanner>,
    registry: Arc<AgentRegistry>,
    router: RoleRouter,
    events: Arc<dyn EventSink>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// An orchestrator with the pattern planner, the default agents and
    /// tracing events.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            planner: Arc::new(PatternPlanner::from_config(&config)),
            registry: Arc::new(AgentRegistry::with_defaults()),
            router: RoleRouter::default(),
            events: Arc::new(TracingSink),
            config,
        }
    }

    /// Replace the decomposition policy.
    pub fn with_planner(mut self, planner: impl TaskPlanner + 'static) -> Self {
        self.planner = Arc::new(planner);
        self
    }

    /// Replace the agent registry.
    pub fn with_registry(mut self, registry: AgentRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replace the task type to role mapping.
    pub fn with_router(mut self, router: RoleRouter) -> Self {
        self.router = router;
        self
    }

    /// Send events to `events` instead of the tracing log.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Engine limits in use.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The shared agent registry.
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Decompose a command without running it.
    pub fn plan(&self, command: &str) -> Vec<Task> {
        self.planner.plan(command)
    }

    /// A scheduler sharing this orchestrator's agents, routes and events.
    ///
    /// Use this to drive a hand-built graph or to cancel tasks mid-run.
    pub fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            Arc::clone(&self.registry),
            self.router.clone(),
            Arc::clone(&self.events),
            self.config.clone(),
        )
    }

    /// Decompose the root task's description, run the resulting graph and
    /// complete the root with the validated aggregate.
    ///
    /// Task-level failures are recorded in the result. An error is returned
    /// only when the planned graph is structurally invalid.
    pub async fn process(&self, mut root: Task) -> MaestroResult<OrchestratorResult> {
        info!(task_id = %root.id, command = %root.description, "Processing command");
        root.mark_started();
        self.events.emit(OrchestrationEvent::task_updated(&root));

        let subtasks = self.planner.plan(&root.description);
        info!(
            task_id = %root.id,
            subtasks = subtasks.len(),
            types = ?subtasks.iter().map(|t| t.task_type.as_str()).collect::<Vec<_>>(),
            "Command decomposed"
        );

        let scheduler = self.scheduler();
        if let Err(e) = scheduler.submit(subtasks).await {
            root.fail(e.to_string());
            self.events.emit(OrchestrationEvent::task_updated(&root));
            return Err(e);
        }
        let report = scheduler.run().await;

        let outcomes: Vec<TaskOutcome> = report.tasks.iter().map(TaskOutcome::from_task).collect();
        let result = validate_result(aggregate(&outcomes));
        root.complete(serde_json::to_value(&result)?);
        self.events.emit(OrchestrationEvent::task_updated(&root));

        info!(
            task_id = %root.id,
            summary = %result.aggregate.summary,
            quality_score = result.quality_score,
            validation_passed = result.validation_passed,
            "Command processed"
        );

        Ok(OrchestratorResult {
            root,
            subtasks: report.tasks,
            result,
            deadlocked: report.deadlocked,
            batches: report.batches,
        })
    }

    /// Wrap `command` in a root task of type `command` and process it.
    pub async fn run_command(&self, command: &str) -> MaestroResult<OrchestratorResult> {
        let root = Task::new("command", command);
        self.events.emit(OrchestrationEvent::task_created(&root));
        self.process(root).await
    }

    /// Summaries of the live agents.
    pub async fn agents(&self) -> Vec<AgentSummary> {
        self.registry.snapshot().await
    }

    /// Release every live agent.
    pub async fn cleanup(&self) {
        self.registry.clear().await;
        info!("Orchestrator cleaned up");
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use maestro_core::TaskStatus;

    struct SelfLoopPlanner;

    impl TaskPlanner for SelfLoopPlanner {
        fn plan(&self, _command: &str) -> Vec<Task> {
            let task = Task::new("research", "loop").with_id("loop");
            vec![task.with_dependencies(vec!["loop".into()])]
        }
    }

    #[tokio::test]
    async fn test_run_command_completes_root() {
        let orchestrator = Orchestrator::default();
        let outcome = orchestrator
            .run_command("Research the latest AI trends")
            .await
            .unwrap();

        assert_eq!(outcome.root.task_type, "command");
        assert_eq!(outcome.root.status, TaskStatus::Completed);
        assert_eq!(outcome.subtasks.len(), 2);
        assert_eq!(outcome.batches, 2);
        assert!(!outcome.deadlocked);
        let root_result = outcome.root.result.unwrap();
        assert_eq!(root_result["summary"], outcome.result.aggregate.summary);
    }

    #[tokio::test]
    async fn test_invalid_plan_is_error() {
        let orchestrator = Orchestrator::default().with_planner(SelfLoopPlanner);
        assert!(orchestrator.run_command("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_releases_agents() {
        let orchestrator = Orchestrator::default();
        orchestrator.run_command("implement a parser").await.unwrap();
        assert!(!orchestrator.agents().await.is_empty());

        orchestrator.cleanup().await;
        assert!(orchestrator.agents().await.is_empty());
    }
}
