use crate::config::OrchestratorConfig;
use maestro_core::{MaestroError, MaestroResult, Task};
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

/// Turns a natural-language command into a dependency-annotated task list.
pub trait TaskPlanner: Send + Sync {
    /// Decompose `command`. Every returned task's dependencies must refer to
    /// other tasks in the same list.
    fn plan(&self, command: &str) -> Vec<Task>;
}

/// Intent categories recognised by [`PatternPlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Research,
    Code,
    Analysis,
    Validation,
}

impl Category {
    /// Evaluation order. Generated tasks follow this order.
    pub const ALL: [Category; 4] = [
        Category::Research,
        Category::Code,
        Category::Analysis,
        Category::Validation,
    ];

    fn default_patterns(self) -> &'static [&'static str] {
        match self {
            Category::Research => &[
                "research",
                "find.*information",
                "search.*for",
                "look.*up",
                "what.*is",
                "gather.*data",
            ],
            Category::Code => &[
                "create.*code",
                "write.*function",
                "implement",
                "generate.*api",
                "build.*app",
                "fix.*bug",
                "refactor",
            ],
            Category::Analysis => &["analyze", "examine", "review", "summarize", "compare"],
            Category::Validation => &["test", "validate", "verify", "check"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Research => "research",
            Category::Code => "code",
            Category::Analysis => "analysis",
            Category::Validation => "validation",
        };
        f.write_str(name)
    }
}

struct Rule {
    category: Category,
    patterns: Vec<Regex>,
}

/// Keyword and pattern based decomposition.
///
/// The lower-cased command is matched against each category's patterns. A
/// research, code or analysis match adds a subtask of that type; every
/// subtask after the first depends on the first. When anything matched, a
/// trailing `validate` task depending on all of them is appended. When
/// nothing matched, a single general research task is returned.
///
/// The validation category only affects logging: an explicit "test" or
/// "verify" in the command does not add a second validation task.
pub struct PatternPlanner {
    rules: Vec<Rule>,
    criteria: String,
    research_max_results: u64,
}

impl PatternPlanner {
    /// A planner with the built-in patterns and default config.
    pub fn new() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }

    /// Use the criteria and research limits from `config`.
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        let rules = Category::ALL
            .iter()
            .map(|&category| Rule {
                category,
                patterns: category
                    .default_patterns()
                    .iter()
                    .filter_map(|p| match Regex::new(p) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            warn!(pattern = p, error = %e, "Skipping invalid built-in pattern");
                            None
                        }
                    })
                    .collect(),
            })
            .collect();
        Self {
            rules,
            criteria: config.default_criteria.clone(),
            research_max_results: config.research_max_results,
        }
    }

    /// Add patterns to a category. Patterns are matched against the
    /// lower-cased command.
    pub fn with_patterns(mut self, category: Category, patterns: &[&str]) -> MaestroResult<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| MaestroError::Config(format!("invalid pattern '{p}': {e}")))
            })
            .collect::<MaestroResult<Vec<_>>>()?;
        if let Some(rule) = self.rules.iter_mut().find(|r| r.category == category) {
            rule.patterns.extend(compiled);
        }
        Ok(self)
    }

    /// Categories whose patterns match `command`, in evaluation order.
    pub fn matched_categories(&self, command: &str) -> Vec<Category> {
        let normalized = command.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.patterns.iter().any(|re| re.is_match(&normalized)))
            .map(|rule| rule.category)
            .collect()
    }

    fn subtask(&self, category: Category, command: &str) -> Option<Task> {
        let task = match category {
            Category::Research => Task::new("research", format!("Research: {command}"))
                .with_param("query", command)
                .with_param("max_results", self.research_max_results)
                .with_priority(10),
            Category::Code => Task::new("code", format!("Code: {command}"))
                .with_param("requirements", command)
                .with_priority(8),
            Category::Analysis => Task::new("analysis", format!("Analysis: {command}"))
                .with_param("data_source", "research_results")
                .with_priority(7),
            Category::Validation => return None,
        };
        Some(task)
    }
}

impl Default for PatternPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskPlanner for PatternPlanner {
    fn plan(&self, command: &str) -> Vec<Task> {
        let matched = self.matched_categories(command);
        debug!(?matched, "Matched command categories");

        let mut tasks: Vec<Task> = Vec::new();
        for &category in &matched {
            let Some(task) = self.subtask(category, command) else {
                continue;
            };
            let deps = tasks.first().map(|t| vec![t.id.clone()]).unwrap_or_default();
            tasks.push(task.with_dependencies(deps));
        }

        if tasks.is_empty() {
            return vec![Task::new("research", format!("General research: {command}"))
                .with_param("query", command)
                .with_priority(5)];
        }

        let all: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        tasks.push(
            Task::new("validate", format!("Validate results for: {command}"))
                .with_param("criteria", self.criteria.as_str())
                .with_priority(5)
                .with_dependencies(all),
        );
        tasks
    }
}
