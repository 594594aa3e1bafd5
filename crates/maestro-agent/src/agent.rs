use crate::code::CodeAgent;
use crate::config::ModelConfig;
use crate::profiles::AgentProfile;
use crate::research::ResearchAgent;
use crate::types::{AgentId, AgentMetadata, AgentRole, AgentStatus};
use crate::validator::ValidatorAgent;
use async_trait::async_trait;
use maestro_core::{MaestroError, MaestroResult, Task};
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use tracing::{debug, error, warn};

/// Capability contract shared by every agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Identity and default model settings of this agent.
    fn profile(&self) -> AgentProfile;

    /// Task types this agent accepts.
    fn accepted_types(&self) -> &[&str];

    /// Pure acceptance predicate over the task type.
    fn validate(&self, task: &Task) -> bool {
        self.accepted_types().contains(&task.task_type.as_str())
    }

    /// Domain logic. Errors are recorded on the task by [`AgentInstance::run`].
    async fn execute(&self, task: &Task) -> MaestroResult<Value>;
}

/// The closed set of agents the engine knows how to build, plus one slot
/// for externally supplied implementations.
pub enum AgentKind {
    Research(ResearchAgent),
    Code(CodeAgent),
    Validator(ValidatorAgent),
    Custom(Box<dyn Agent>),
}

impl AgentKind {
    fn as_agent(&self) -> &dyn Agent {
        match self {
            AgentKind::Research(agent) => agent,
            AgentKind::Code(agent) => agent,
            AgentKind::Validator(agent) => agent,
            AgentKind::Custom(agent) => agent.as_ref(),
        }
    }
}

impl From<ResearchAgent> for AgentKind {
    fn from(agent: ResearchAgent) -> Self {
        AgentKind::Research(agent)
    }
}

impl From<CodeAgent> for AgentKind {
    fn from(agent: CodeAgent) -> Self {
        AgentKind::Code(agent)
    }
}

impl From<ValidatorAgent> for AgentKind {
    fn from(agent: ValidatorAgent) -> Self {
        AgentKind::Validator(agent)
    }
}

/// A live agent: its metadata and counters plus the logic that runs tasks.
///
/// One instance processes at most one task at a time; `run` takes `&mut self`
/// so sharing an instance requires external exclusion.
pub struct AgentInstance {
    metadata: AgentMetadata,
    kind: AgentKind,
}

impl std::fmt::Debug for AgentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentInstance")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl AgentInstance {
    /// Wrap one of the built-in agents or a custom one.
    pub fn new(kind: impl Into<AgentKind>) -> Self {
        let kind = kind.into();
        let metadata = AgentMetadata::from_profile(kind.as_agent().profile());
        Self { metadata, kind }
    }

    /// Wrap an arbitrary [`Agent`] implementation.
    pub fn custom(agent: impl Agent + 'static) -> Self {
        Self::new(AgentKind::Custom(Box::new(agent)))
    }

    /// Override the model settings taken from the profile.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.metadata.model = model;
        self
    }

    /// Unique agent id.
    pub fn id(&self) -> &AgentId {
        &self.metadata.id
    }

    /// The role this agent serves.
    pub fn role(&self) -> AgentRole {
        self.metadata.role
    }

    /// Display name from the profile.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Current lifecycle status.
    pub fn status(&self) -> AgentStatus {
        self.metadata.status
    }

    /// Metadata and counters.
    pub fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    /// Whether the agent accepts this task type.
    pub fn validate(&self, task: &Task) -> bool {
        self.kind.as_agent().validate(task)
    }

    /// System prompt built from the agent's current profile and model.
    pub fn system_prompt(&self) -> String {
        AgentProfile {
            role: self.metadata.role,
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            model: self.metadata.model.clone(),
            tools: self.metadata.tools.clone(),
        }
        .system_prompt()
    }

    /// Execute a task with lifecycle bookkeeping.
    ///
    /// A rejected task comes back failed without `execute` being invoked.
    /// Otherwise the task ends completed or failed and the matching counter
    /// is incremented. The agent is always returned to idle afterwards,
    /// including when `execute` panics.
    pub async fn run(&mut self, mut task: Task) -> Task {
        if !self.validate(&task) {
            let rejection = MaestroError::ValidationRejected {
                agent: self.metadata.name.clone(),
                task_type: task.task_type.clone(),
            };
            warn!(agent = %self.metadata.name, task_id = %task.id, "{rejection}");
            task.fail(rejection.to_string());
            return task;
        }

        let Self { metadata, kind } = self;
        let mut busy = BusyGuard::enter(metadata, &task);
        task.mark_started();
        debug!(agent_id = %busy.id, task_id = %task.id, task_type = %task.task_type, "Agent executing task");

        match kind.as_agent().execute(&task).await {
            Ok(result) => {
                task.complete(result);
                busy.completed_tasks += 1;
            }
            Err(e) => {
                error!(agent_id = %busy.id, task_id = %task.id, error = %e, "Agent task failed");
                task.fail(e.to_string());
                busy.failed_tasks += 1;
            }
        }

        task
    }
}

/// Marks an agent as executing for the guard's lifetime and restores it to
/// idle on drop, whichever way execution ends.
struct BusyGuard<'a> {
    metadata: &'a mut AgentMetadata,
}

impl<'a> BusyGuard<'a> {
    fn enter(metadata: &'a mut AgentMetadata, task: &Task) -> Self {
        metadata.status = AgentStatus::Executing;
        metadata.current_task = Some(task.id.clone());
        Self { metadata }
    }
}

impl Deref for BusyGuard<'_> {
    type Target = AgentMetadata;

    fn deref(&self) -> &Self::Target {
        self.metadata
    }
}

impl DerefMut for BusyGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.metadata
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.metadata.status = AgentStatus::Idle;
        self.metadata.current_task = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::profiles;
    use maestro_core::TaskStatus;

    struct FailingAgent;

    #[async_trait]
    impl Agent for FailingAgent {
        fn profile(&self) -> AgentProfile {
            AgentProfile {
                role: AgentRole::Custom,
                name: "Failing Agent".to_string(),
                description: "Always fails".to_string(),
                model: ModelConfig::default(),
                tools: Vec::new(),
            }
        }

        fn accepted_types(&self) -> &[&str] {
            &["flaky"]
        }

        async fn execute(&self, _task: &Task) -> MaestroResult<Value> {
            Err(MaestroError::Execution("upstream unavailable".to_string()))
        }
    }

    struct PanickingAgent;

    #[async_trait]
    impl Agent for PanickingAgent {
        fn profile(&self) -> AgentProfile {
            profiles::research_profile()
        }

        fn accepted_types(&self) -> &[&str] {
            &["research"]
        }

        async fn execute(&self, _task: &Task) -> MaestroResult<Value> {
            panic!("agent exploded");
        }
    }

    #[tokio::test]
    async fn test_run_completes_and_counts() {
        let mut agent = AgentInstance::new(CodeAgent::new());
        let task = Task::new("code", "Code: login endpoint")
            .with_param("requirements", "login endpoint");

        let done = agent.run(task).await;

        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.result.is_some());
        assert!(done.started_at.is_some());
        assert!(done.completed_at.is_some());
        assert_eq!(agent.metadata().completed_tasks, 1);
        assert_eq!(agent.status(), AgentStatus::Idle);
        assert!(agent.metadata().current_task.is_none());
    }

    #[tokio::test]
    async fn test_run_rejects_unaccepted_type() {
        let mut agent = AgentInstance::new(CodeAgent::new());
        let task = Task::new("research", "Research: AI");
        assert!(!agent.validate(&task));

        let done = agent.run(task).await;

        assert_eq!(done.status, TaskStatus::Failed);
        let error = done.error.unwrap();
        assert!(error.contains("cannot handle task type research"), "{error}");
        assert!(done.started_at.is_none());
        assert_eq!(agent.metadata().completed_tasks, 0);
        assert_eq!(agent.metadata().failed_tasks, 0);
    }

    #[tokio::test]
    async fn test_run_records_execution_error() {
        let mut agent = AgentInstance::custom(FailingAgent);
        let done = agent.run(Task::new("flaky", "try")).await;

        assert_eq!(done.status, TaskStatus::Failed);
        assert!(done.error.unwrap().contains("upstream unavailable"));
        assert!(done.result.is_none());
        assert_eq!(agent.metadata().failed_tasks, 1);
        assert_eq!(agent.status(), AgentStatus::Idle);
    }

    #[tokio::test]
    async fn test_validate_is_pure() {
        let agent = AgentInstance::new(ResearchAgent::new());
        let task = Task::new("analysis", "Analysis: x");
        assert_eq!(agent.validate(&task), agent.validate(&task));
        assert!(agent.validate(&task));
    }

    #[tokio::test]
    async fn test_agent_reset_after_panic() {
        let agent = std::sync::Arc::new(tokio::sync::Mutex::new(AgentInstance::custom(
            PanickingAgent,
        )));
        let shared = agent.clone();
        let joined = tokio::spawn(async move {
            let mut guard = shared.lock().await;
            guard.run(Task::new("research", "boom")).await
        })
        .await;

        assert!(joined.is_err());
        let agent = agent.lock().await;
        assert_eq!(agent.status(), AgentStatus::Idle);
        assert!(agent.metadata().current_task.is_none());
    }

    #[test]
    fn test_with_model_override() {
        let agent = AgentInstance::new(ValidatorAgent::new()).with_model(ModelConfig::new(
            "small",
            0.0,
            100,
        ));
        assert_eq!(agent.metadata().model.model, "small");
        assert_eq!(agent.role(), AgentRole::Validator);
        assert!(agent.system_prompt().contains("Quality Validator"));
    }
}
