#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Regression tests for maestro-agent: roles, profiles, built-in agents and instance lifecycle.

use async_trait::async_trait;
use maestro_agent::{
    default_profiles, AgentInstance, AgentRole, AgentStatus, CodeAgent, CriterionValidator,
    ModelConfig, ResearchAgent, Tool, ValidatorAgent,
};
use maestro_core::{MaestroResult, Task, TaskStatus};
use serde_json::{json, Value};
use std::sync::Arc;

// --- Roles & profiles ---

#[test]
fn test_role_roundtrip_through_string() {
    for role in AgentRole::ALL {
        let parsed: AgentRole = role.to_string().parse().unwrap();
        assert_eq!(parsed, role);
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, format!("\"{role}\""));
    }
    assert!("wizard".parse::<AgentRole>().is_err());
}

#[test]
fn test_default_profiles_cover_builtin_roles() {
    let roles: Vec<AgentRole> = default_profiles().iter().map(|p| p.role).collect();
    assert_eq!(
        roles,
        [
            AgentRole::Orchestrator,
            AgentRole::Research,
            AgentRole::Code,
            AgentRole::Validator
        ]
    );
}

#[test]
fn test_system_prompt_mentions_identity() {
    let agent = AgentInstance::new(ValidatorAgent::new());
    let prompt = agent.system_prompt();
    assert!(prompt.contains("Quality Validator"));
    assert!(prompt.contains("validator agent"));
}

// --- Instance lifecycle ---

#[tokio::test]
async fn test_instance_counters_accumulate() {
    let mut agent = AgentInstance::new(CodeAgent::new());
    for _ in 0..3 {
        let done = agent.run(Task::new("code", "build a cli")).await;
        assert_eq!(done.status, TaskStatus::Completed);
    }
    let rejected = agent.run(Task::new("research", "nope")).await;
    assert_eq!(rejected.status, TaskStatus::Failed);

    let meta = agent.metadata();
    assert_eq!(meta.completed_tasks, 3);
    // Rejections never reach execute and are not counted.
    assert_eq!(meta.failed_tasks, 0);
    assert_eq!(meta.status, AgentStatus::Idle);
    assert!(meta.current_task.is_none());
}

#[tokio::test]
async fn test_run_stamps_timestamps() {
    let mut agent = AgentInstance::new(ResearchAgent::new());
    let done = agent.run(Task::new("investigate", "rust")).await;
    let started = done.started_at.unwrap();
    let completed = done.completed_at.unwrap();
    assert!(started >= done.created_at);
    assert!(completed >= started);
    assert!(done.error.is_none());
}

#[test]
fn test_model_override_keeps_identity() {
    let agent = AgentInstance::new(ResearchAgent::new())
        .with_model(ModelConfig::new("local", 5.0, 0));
    assert_eq!(agent.name(), "Research Specialist");
    assert_eq!(agent.metadata().model.temperature, 2.0);
    assert_eq!(agent.metadata().model.max_tokens, 1);
}

#[test]
fn test_summary_serializes() {
    let agent = AgentInstance::new(CodeAgent::new());
    let json = serde_json::to_value(agent.metadata().to_summary()).unwrap();
    assert_eq!(json["role"], "code");
    assert_eq!(json["status"], "idle");
    assert!(json["id"].as_str().unwrap().starts_with("agent_"));
}

// --- Tool injection ---

struct EmptySearch;

#[async_trait]
impl Tool for EmptySearch {
    fn name(&self) -> &str {
        "empty"
    }

    async fn invoke(&self, _params: Value) -> MaestroResult<Value> {
        Ok(json!([]))
    }
}

#[tokio::test]
async fn test_research_with_no_hits() {
    let mut agent = AgentInstance::new(ResearchAgent::with_search(Arc::new(EmptySearch)));
    let done = agent.run(Task::new("research", "obscure topic")).await;
    let result = done.result.unwrap();
    assert_eq!(result["total_sources"], 0);
    assert_eq!(result["query"], "obscure topic");
    assert_eq!(
        result["synthesis"]["summary"],
        "Analysis of 0 sources reveals key themes"
    );
}

// --- Validation ---

#[tokio::test]
async fn test_validator_on_research_output() {
    let mut research = AgentInstance::new(ResearchAgent::new());
    let findings = research
        .run(Task::new("research", "AI trends"))
        .await
        .result
        .unwrap();

    let mut validator = AgentInstance::new(ValidatorAgent::new());
    let done = validator
        .run(
            Task::new("validate", "check research")
                .with_param("criteria", "quality, accuracy ,completeness")
                .with_param("data", findings),
        )
        .await;
    let report = done.result.unwrap();

    // quality gets the results and synthesis bonuses
    let quality = report["criteria_results"]["quality"]["score"].as_f64().unwrap();
    assert!((quality - 0.95).abs() < 1e-9);
    assert_eq!(report["criteria_results"]["completeness"]["status"], "fail");
    assert_eq!(report["issues"].as_array().unwrap().len(), 1);
}

#[test]
fn test_unknown_criterion_uses_quality_check() {
    let validator = CriterionValidator::new();
    let report = validator.validate(&["style".to_string()], &json!({}));
    let style = &report.criteria_results["style"];
    assert!((style["score"].as_f64().unwrap() - 0.85).abs() < 1e-9);
    assert!(report.passed);
}
