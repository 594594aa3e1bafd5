use maestro_agent::AgentRole;
use maestro_core::{MaestroError, MaestroResult};
use std::collections::HashMap;

/// Maps task types to the agent role that executes them.
///
/// The default table routes `research` and `analysis` to the research role,
/// `code` to the code role and `validate` to the validator role.
#[derive(Debug, Clone)]
pub struct RoleRouter {
    routes: HashMap<String, AgentRole>,
}

impl Default for RoleRouter {
    fn default() -> Self {
        Self::empty()
            .with_route("research", AgentRole::Research)
            .with_route("analysis", AgentRole::Research)
            .with_route("code", AgentRole::Code)
            .with_route("validate", AgentRole::Validator)
    }
}

impl RoleRouter {
    /// The built-in type to role mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with no routes.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Add or replace the route for `task_type`.
    pub fn with_route(mut self, task_type: impl Into<String>, role: AgentRole) -> Self {
        self.routes.insert(task_type.into(), role);
        self
    }

    /// Role for a task type, or `UnknownRole` when none is mapped.
    pub fn resolve(&self, task_type: &str) -> MaestroResult<AgentRole> {
        self.routes.get(task_type).copied().ok_or_else(|| {
            MaestroError::UnknownRole(format!("no role mapped for task type '{task_type}'"))
        })
    }
}
