//! Agent capability contract and the built-in specialised agents.
//!
//! Every agent answers two questions: can it accept a task (`validate`) and
//! what does the task produce (`execute`). [`AgentInstance::run`] wraps both
//! with lifecycle bookkeeping and is the only entry point callers should use.
//!
//! # Main types
//!
//! - [`Agent`] — Capability trait implemented by every agent.
//! - [`AgentKind`] — Closed set of built-in agents plus a custom escape hatch.
//! - [`AgentInstance`] — A live agent: metadata, counters and its [`AgentKind`].
//! - [`CriterionValidator`] — Named quality checks used by the validator agent.
//! - [`Tool`] — Opaque async tool backend invoked from `execute`.

/// Agent trait, closed agent set and the guarded `run` entry point.
pub mod agent;
/// Code generation, analysis, test and review agent.
pub mod code;
/// Model configuration pass-through.
pub mod config;
/// Named criterion checks and validation reports.
pub mod criteria;
/// Default agent profiles per role.
pub mod profiles;
/// Information gathering and synthesis agent.
pub mod research;
/// Tool backends consumed by agents.
pub mod tools;
/// Agent identity, role, status and metadata.
pub mod types;
/// Quality validation agent.
pub mod validator;

pub use agent::{Agent, AgentInstance, AgentKind};
pub use code::CodeAgent;
pub use config::ModelConfig;
pub use criteria::{
    CheckStatus, Criterion, CriterionResult, CriterionValidator, ValidationReport, DEFAULT_CRITERIA,
};
pub use profiles::{default_profiles, AgentProfile};
pub use research::ResearchAgent;
pub use tools::{SimulatedSearch, Tool};
pub use types::{AgentId, AgentMetadata, AgentRole, AgentStatus, AgentSummary};
pub use validator::ValidatorAgent;
