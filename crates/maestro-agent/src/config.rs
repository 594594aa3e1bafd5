use serde::{Deserialize, Serialize};

/// Model parameters carried by an agent.
///
/// The engine never interprets these values; they are passed through to
/// whatever model-backed implementation an agent uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ModelConfig {
    /// Model settings with temperature clamped to `[0, 2]` and at least one token.
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature: temperature.clamp(0.0, 2.0),
            max_tokens: max_tokens.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 2000);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: ModelConfig = serde_json::from_str(r#"{"temperature": 0.1}"#).unwrap();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_tokens, 2000);
    }

    #[test]
    fn test_new_clamps_ranges() {
        let config = ModelConfig::new("local", 3.5, 0);
        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.max_tokens, 1);
    }
}
