use std::collections::HashSet;
use std::path::Path;

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Result, SmokeError};
use crate::rules::Condition;

const BUILTIN_CONFIG: &str = include_str!("default_config.yaml");

pub const DEFAULT_DOT: &str = "dot";
pub const DEFAULT_SOURCE: &str = "digraph { a -> b; }";

fn default_dot() -> String {
    DEFAULT_DOT.to_string()
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_strict() -> bool {
    true
}

/// Smoke suite definition: what must be installed and what must work
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SmokeConfig {
    /// Expected tool names, checked in this order
    #[validate(length(min = 1, message = "at least one tool is required"))]
    pub tools: Vec<String>,

    /// Known gaps; first matching rule wins
    #[serde(default)]
    #[validate]
    pub exclusions: Vec<ExclusionRule>,

    /// Output formats rendered through the layout binary
    #[serde(default)]
    #[validate]
    pub formats: Vec<FormatTarget>,

    /// CI job names whose binaries are built with AddressSanitizer
    #[serde(default)]
    pub asan_jobs: Vec<String>,

    /// Binary used for format and version checks
    #[serde(default = "default_dot")]
    #[validate(length(min = 1))]
    pub dot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExclusionRule {
    #[serde(default)]
    pub when: Condition,

    #[validate(length(min = 1, message = "an exclusion rule must name at least one tool"))]
    pub tools: Vec<String>,

    /// Upstream issues tracking the gap
    #[serde(default)]
    pub issues: Vec<u32>,

    /// Skip reason; `{tool}`, `{os_id}` and `{build_system}` are expanded
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FormatTarget {
    /// `-T` argument, e.g. `png:gd`
    #[validate(length(min = 1))]
    pub format: String,

    /// Graph fed on stdin
    #[serde(default = "default_source")]
    #[validate(length(min = 1))]
    pub source: String,

    #[serde(default)]
    pub issue: Option<u32>,

    #[serde(default)]
    pub xfail: Option<ExpectedFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExpectedFailure {
    #[serde(default)]
    pub when: Condition,
    pub reason: String,
    /// An unexpected pass counts as a failure
    #[serde(default = "default_strict")]
    pub strict: bool,
}

impl SmokeConfig {
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CONFIG)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: SmokeConfig = serde_yaml::from_str(content)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load `path`, or the built-in suite when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    SmokeError::ConfigError(format!("cannot read {}: {}", path.display(), e))
                })?;
                tracing::debug!(config = %path.display(), "Loading config file");
                Self::from_yaml(&content)
            }
            None => Self::builtin(),
        }
    }

    fn validate_all(&self) -> Result<()> {
        self.validate()?;

        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.as_str()) {
                return Err(SmokeError::ValidationError(format!(
                    "tool '{}' is listed more than once",
                    tool
                )));
            }
        }

        let mut formats = HashSet::new();
        for target in &self.formats {
            if !formats.insert(target.format.as_str()) {
                return Err(SmokeError::ValidationError(format!(
                    "format '{}' is listed more than once",
                    target.format
                )));
            }
        }

        for rule in &self.exclusions {
            for tool in rule.tools.iter().filter(|t| !seen.contains(t.as_str())) {
                tracing::warn!(tool = %tool, "Exclusion rule names a tool that is not checked");
            }
        }
        Ok(())
    }

    pub fn generate_schema() -> String {
        let schema = schema_for!(SmokeConfig);
        serde_json::to_string_pretty(&schema).unwrap_or_default()
    }
}
