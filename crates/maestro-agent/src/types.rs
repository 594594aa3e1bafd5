use crate::config::ModelConfig;
use crate::profiles::AgentProfile;
use chrono::{DateTime, Utc};
use maestro_core::TaskId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of each agent in the multi-agent system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Decomposes commands and coordinates the other roles.
    Orchestrator,
    /// Gathers and analyses information.
    Research,
    /// Generates, analyses, tests and reviews code.
    Code,
    /// Validates results against quality criteria.
    Validator,
    /// Data processing.
    Data,
    /// Browser automation.
    Browser,
    /// User-supplied agent.
    Custom,
}

impl AgentRole {
    /// Every role, in declaration order.
    pub const ALL: [AgentRole; 7] = [
        AgentRole::Orchestrator,
        AgentRole::Research,
        AgentRole::Code,
        AgentRole::Validator,
        AgentRole::Data,
        AgentRole::Browser,
        AgentRole::Custom,
    ];
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Orchestrator => write!(f, "orchestrator"),
            AgentRole::Research => write!(f, "research"),
            AgentRole::Code => write!(f, "code"),
            AgentRole::Validator => write!(f, "validator"),
            AgentRole::Data => write!(f, "data"),
            AgentRole::Browser => write!(f, "browser"),
            AgentRole::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentRole::ALL
            .into_iter()
            .find(|role| role.to_string() == s)
            .ok_or_else(|| format!("unknown agent role: {s}"))
    }
}

/// Lifecycle status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Thinking,
    Executing,
    Waiting,
    Completed,
    Failed,
    Cancelled,
}

/// Unique identifier for an agent instance, `agent_<12 hex chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// A fresh random id.
    pub fn new() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("agent_{}", &hex[..12]))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity, configuration and running counters of one agent instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub id: AgentId,
    pub role: AgentRole,
    pub name: String,
    pub description: String,
    pub model: ModelConfig,
    /// Capability tags.
    pub tools: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: AgentStatus,
    pub current_task: Option<TaskId>,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
}

impl AgentMetadata {
    /// Idle metadata with zeroed counters for a new agent.
    pub fn from_profile(profile: AgentProfile) -> Self {
        Self {
            id: AgentId::new(),
            role: profile.role,
            name: profile.name,
            description: profile.description,
            model: profile.model,
            tools: profile.tools,
            created_at: Utc::now(),
            status: AgentStatus::Idle,
            current_task: None,
            completed_tasks: 0,
            failed_tasks: 0,
        }
    }

    /// Compact snapshot for dashboards and event payloads.
    pub fn to_summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
            status: self.status,
            current_task: self.current_task.clone(),
            completed_tasks: self.completed_tasks,
            failed_tasks: self.failed_tasks,
            created_at: self.created_at,
        }
    }
}

/// Serializable snapshot of an agent's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: String,
    pub role: AgentRole,
    pub status: AgentStatus,
    pub current_task: Option<TaskId>,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub created_at: DateTime<Utc>,
}
