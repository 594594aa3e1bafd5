use crate::agent::Agent;
use crate::criteria::{CriterionValidator, DEFAULT_CRITERIA};
use crate::profiles::{self, AgentProfile};
use async_trait::async_trait;
use maestro_core::{MaestroError, MaestroResult, Task};
use serde_json::{Map, Value};
use tracing::debug;

/// Scores results against named quality criteria.
///
/// Reads `criteria` (comma separated string or array of names) and `data`
/// (the payload to check, `{}` when absent) from the task parameters.
#[derive(Debug, Default)]
pub struct ValidatorAgent {
    validator: CriterionValidator,
}

impl ValidatorAgent {
    /// A validator agent with the built-in criteria.
    pub fn new() -> Self {
        Self::default()
    }

    fn criteria(task: &Task) -> MaestroResult<Vec<String>> {
        match task.params.get("criteria") {
            None | Some(Value::Null) => Ok(CriterionValidator::parse_criteria(DEFAULT_CRITERIA)),
            Some(Value::String(spec)) => Ok(CriterionValidator::parse_criteria(spec)),
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .map(|v| {
                        v.as_str().ok_or_else(|| {
                            MaestroError::Execution(format!("criterion must be a string, got {v}"))
                        })
                    })
                    .collect::<MaestroResult<Vec<&str>>>()?
                    .join(",");
                Ok(CriterionValidator::parse_criteria(&joined))
            }
            Some(other) => Err(MaestroError::Execution(format!(
                "criteria must be a string or a list, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl Agent for ValidatorAgent {
    fn profile(&self) -> AgentProfile {
        profiles::validator_profile()
    }

    fn accepted_types(&self) -> &[&str] {
        &["validate", "verify", "check", "test", "quality"]
    }

    async fn execute(&self, task: &Task) -> MaestroResult<Value> {
        let criteria = Self::criteria(task)?;
        let empty = Value::Object(Map::new());
        let data = task.params.get("data").unwrap_or(&empty);

        let report = self.validator.validate(&criteria, data);
        debug!(
            task_id = %task.id,
            score = report.score,
            passed = report.passed,
            "Validation complete"
        );
        Ok(serde_json::to_value(report)?)
    }
}
