use crate::config::ModelConfig;
use crate::types::AgentRole;
use serde::{Deserialize, Serialize};

/// Static description of an agent: who it is and which model settings it carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub role: AgentRole,
    pub name: String,
    pub description: String,
    pub model: ModelConfig,
    pub tools: Vec<String>,
}

impl AgentProfile {
    /// Replace the model settings, keeping identity and tools.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Prompt rendered from the profile for model-backed agents.
    pub fn system_prompt(&self) -> String {
        let tools = if self.tools.is_empty() {
            "None".to_string()
        } else {
            self.tools.join(", ")
        };
        format!(
            "You are {name}, a {role} agent.\n\n\
             Description: {description}\n\n\
             Available tools: {tools}\n\n\
             Your role is to {role} tasks efficiently and accurately.\n\
             Always provide clear, actionable results.",
            name = self.name,
            role = self.role,
            description = self.description,
        )
    }
}

/// Default profiles for every role that ships with a built-in agent.
pub fn default_profiles() -> Vec<AgentProfile> {
    vec![
        orchestrator_profile(),
        research_profile(),
        code_profile(),
        validator_profile(),
    ]
}

/// Lower temperature keeps decompositions consistent.
pub fn orchestrator_profile() -> AgentProfile {
    AgentProfile {
        role: AgentRole::Orchestrator,
        name: "Main Orchestrator".to_string(),
        description: "Coordinates multi-agent workflows from natural-language commands"
            .to_string(),
        model: ModelConfig::new("gpt-4", 0.3, 4000),
        tools: tags(&["command_parser", "agent_spawner", "result_aggregator"]),
    }
}

/// Research role: broad sourcing, higher temperature.
pub fn research_profile() -> AgentProfile {
    AgentProfile {
        role: AgentRole::Research,
        name: "Research Specialist".to_string(),
        description: "Gathers and analyzes information from multiple sources".to_string(),
        model: ModelConfig::new("gpt-4", 0.7, 3000),
        tools: tags(&["web_search", "web_scraper", "source_validator"]),
    }
}

/// Code role: low temperature, larger token budget.
pub fn code_profile() -> AgentProfile {
    AgentProfile {
        role: AgentRole::Code,
        name: "Code Specialist".to_string(),
        description: "Generates, analyzes, and improves code".to_string(),
        model: ModelConfig::new("gpt-4", 0.2, 4000),
        tools: tags(&[
            "code_generator",
            "code_analyzer",
            "test_runner",
            "cli_executor",
        ]),
    }
}

/// Validator role: lowest temperature.
pub fn validator_profile() -> AgentProfile {
    AgentProfile {
        role: AgentRole::Validator,
        name: "Quality Validator".to_string(),
        description: "Validates results and ensures quality standards".to_string(),
        model: ModelConfig::new("gpt-4", 0.1, 2000),
        tools: tags(&["test_runner", "quality_checker", "result_validator"]),
    }
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_count() {
        assert_eq!(default_profiles().len(), 4);
    }

    #[test]
    fn test_code_and_validator_low_temperature() {
        assert!(code_profile().model.temperature <= 0.3);
        assert!(validator_profile().model.temperature <= 0.3);
        assert!(research_profile().model.temperature > code_profile().model.temperature);
    }

    #[test]
    fn test_system_prompt_mentions_tools() {
        let prompt = research_profile().system_prompt();
        assert!(prompt.contains("Research Specialist"));
        assert!(prompt.contains("web_search, web_scraper, source_validator"));
        assert!(prompt.contains("a research agent"));
    }

    #[test]
    fn test_system_prompt_without_tools() {
        let mut profile = validator_profile();
        profile.tools.clear();
        assert!(profile.system_prompt().contains("Available tools: None"));
    }

    #[test]
    fn test_with_model_override() {
        let profile = code_profile().with_model(ModelConfig::new("local-coder", 0.0, 512));
        assert_eq!(profile.model.model, "local-coder");
        assert_eq!(profile.role, AgentRole::Code);
    }
}
