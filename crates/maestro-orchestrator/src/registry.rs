use maestro_agent::{
    AgentInstance, AgentRole, AgentSummary, CodeAgent, ModelConfig, ResearchAgent, ValidatorAgent,
};
use maestro_core::{MaestroError, MaestroResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Builds a fresh agent instance for a role.
pub type AgentFactory = Arc<dyn Fn() -> AgentInstance + Send + Sync>;

/// A live agent shared between the registry and scheduler workers.
///
/// Holding the lock is what gives a worker exclusive use of the agent, so
/// two tasks routed to the same role never run on it at the same time.
pub type SharedAgent = Arc<Mutex<AgentInstance>>;

/// Keeps at most one live agent per role and spawns them on first use.
///
/// Factories and model overrides are configured up front through `&mut self`;
/// the live-agent map is guarded by an async mutex so lookups from concurrent
/// workers never spawn two instances for the same role.
pub struct AgentRegistry {
    factories: HashMap<AgentRole, AgentFactory>,
    models: HashMap<AgentRole, ModelConfig>,
    active: Mutex<HashMap<AgentRole, SharedAgent>>,
}

impl AgentRegistry {
    /// A registry with no factories.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            models: HashMap::new(),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// A registry with factories for the research, code and validator roles.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_factory(AgentRole::Research, || {
            AgentInstance::new(ResearchAgent::new())
        });
        registry.register_factory(AgentRole::Code, || AgentInstance::new(CodeAgent::new()));
        registry.register_factory(AgentRole::Validator, || {
            AgentInstance::new(ValidatorAgent::new())
        });
        registry
    }

    /// Register (or replace) the factory for a role.
    ///
    /// An agent already spawned for the role keeps running until removed.
    pub fn register_factory(
        &mut self,
        role: AgentRole,
        factory: impl Fn() -> AgentInstance + Send + Sync + 'static,
    ) {
        self.factories.insert(role, Arc::new(factory));
    }

    /// Override the model settings applied to agents spawned for a role.
    pub fn set_model(&mut self, role: AgentRole, model: ModelConfig) {
        self.models.insert(role, model);
    }

    /// Roles that can be spawned, in role order.
    pub fn roles(&self) -> Vec<AgentRole> {
        let mut roles: Vec<AgentRole> = self.factories.keys().copied().collect();
        roles.sort();
        roles
    }

    /// Return the live agent for `role`, spawning it if needed.
    pub async fn get_or_spawn(&self, role: AgentRole) -> MaestroResult<SharedAgent> {
        self.acquire(role).await.map(|(agent, _)| agent)
    }

    /// Like [`get_or_spawn`](Self::get_or_spawn), also reporting whether the
    /// agent was created by this call.
    pub async fn acquire(&self, role: AgentRole) -> MaestroResult<(SharedAgent, bool)> {
        let mut active = self.active.lock().await;
        if let Some(agent) = active.get(&role) {
            return Ok((Arc::clone(agent), false));
        }

        let factory = self.factories.get(&role).ok_or_else(|| {
            MaestroError::UnknownRole(format!("no agent registered for role {role}"))
        })?;
        let mut instance = factory();
        if let Some(model) = self.models.get(&role) {
            instance = instance.with_model(model.clone());
        }
        info!(agent_id = %instance.id(), %role, name = instance.name(), "Spawned agent");

        let agent = Arc::new(Mutex::new(instance));
        active.insert(role, Arc::clone(&agent));
        Ok((agent, true))
    }

    /// The live agent for `role`, without spawning.
    pub async fn get(&self, role: AgentRole) -> Option<SharedAgent> {
        self.active.lock().await.get(&role).cloned()
    }

    /// Drop the live agent for `role`. Returns `false` if none was running.
    ///
    /// Workers already holding the agent finish with it; the next lookup
    /// spawns a fresh instance.
    pub async fn remove(&self, role: AgentRole) -> bool {
        self.active.lock().await.remove(&role).is_some()
    }

    /// Drop every live agent.
    pub async fn clear(&self) {
        let mut active = self.active.lock().await;
        let count = active.len();
        active.clear();
        info!(count, "Cleared agent registry");
    }

    /// Number of live agents.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Summaries of every live agent, in role order.
    ///
    /// Waits for agents that are mid-task to become free.
    pub async fn snapshot(&self) -> Vec<AgentSummary> {
        let agents: Vec<(AgentRole, SharedAgent)> = {
            let active = self.active.lock().await;
            active.iter().map(|(r, a)| (*r, Arc::clone(a))).collect()
        };
        let mut summaries = Vec::with_capacity(agents.len());
        for (role, agent) in agents {
            summaries.push((role, agent.lock().await.metadata().to_summary()));
        }
        summaries.sort_by_key(|(role, _)| *role);
        summaries.into_iter().map(|(_, s)| s).collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
