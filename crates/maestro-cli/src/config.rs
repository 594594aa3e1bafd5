use anyhow::Context;
use maestro_agent::{AgentRole, ModelConfig};
use maestro_orchestrator::OrchestratorConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Contents of `maestro.toml`. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaestroConfig {
    pub orchestrator: OrchestratorConfig,
    pub log: LogConfig,
    /// Model overrides keyed by role name.
    pub models: BTreeMap<String, ModelConfig>,
}

/// Log output settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl MaestroConfig {
    /// Read and validate the config at `path`, falling back to defaults when
    /// the file does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        config.orchestrator.validate()?;
        config.model_overrides()?;
        Ok(config)
    }

    /// Model overrides with role names resolved.
    pub fn model_overrides(&self) -> anyhow::Result<Vec<(AgentRole, ModelConfig)>> {
        self.models
            .iter()
            .map(|(name, model)| {
                let role = name
                    .parse::<AgentRole>()
                    .map_err(|e| anyhow::anyhow!("[models.{name}]: {e}"))?;
                let model = ModelConfig::new(model.model.clone(), model.temperature, model.max_tokens);
                Ok((role, model))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MaestroConfig::load(&dir.path().join("maestro.toml"))
            .await
            .unwrap();
        assert_eq!(config.orchestrator, OrchestratorConfig::default());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Compact);
        assert!(config.models.is_empty());
    }

    #[tokio::test]
    async fn test_full_config() {
        let file = write_config(
            r#"
[orchestrator]
max_concurrent_tasks = 2
task_timeout_secs = 30

[log]
level = "debug"
format = "json"

[models.code]
model = "local-coder"
temperature = 0.0
max_tokens = 1024
"#,
        );
        let config = MaestroConfig::load(file.path()).await.unwrap();
        assert_eq!(config.orchestrator.max_concurrent_tasks, 2);
        assert_eq!(config.orchestrator.research_max_results, 10);
        assert_eq!(config.log.format, LogFormat::Json);

        let overrides = config.model_overrides().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].0, AgentRole::Code);
        assert_eq!(overrides[0].1.model, "local-coder");
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let file = write_config("[models.wizard]\nmodel = \"x\"\n");
        let err = MaestroConfig::load(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("wizard"));
    }

    #[tokio::test]
    async fn test_invalid_limits_rejected() {
        let file = write_config("[orchestrator]\nmax_concurrent_tasks = 0\n");
        assert!(MaestroConfig::load(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_toml() {
        let file = write_config("[orchestrator\n");
        let err = MaestroConfig::load(file.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid config file"));
    }
}
