use maestro_agent::DEFAULT_CRITERIA;
use maestro_core::{MaestroError, MaestroResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Engine limits and planning defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Upper bound on tasks running at once within a batch.
    pub max_concurrent_tasks: usize,
    /// Per-task execution budget in seconds.
    pub task_timeout_secs: u64,
    /// Criteria attached to generated validation tasks.
    pub default_criteria: String,
    /// `max_results` attached to generated research tasks.
    pub research_max_results: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 5,
            task_timeout_secs: 300,
            default_criteria: DEFAULT_CRITERIA.to_string(),
            research_max_results: 10,
        }
    }
}

impl OrchestratorConfig {
    /// Per-task execution budget.
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Reject limits that would stall every run or exceed what the
    /// scheduler can enforce.
    pub fn validate(&self) -> MaestroResult<()> {
        if self.max_concurrent_tasks == 0 {
            return Err(MaestroError::Config(
                "max_concurrent_tasks must be at least 1".into(),
            ));
        }
        if self.max_concurrent_tasks > Semaphore::MAX_PERMITS {
            return Err(MaestroError::Config(format!(
                "max_concurrent_tasks must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.task_timeout_secs == 0 {
            return Err(MaestroError::Config(
                "task_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
