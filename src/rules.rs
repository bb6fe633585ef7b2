//! Exclusion and expected-failure decisions for a CI environment.
//!
//! A [`Condition`] describes an environment (OS, build system, host system,
//! ASan instrumentation, project platform). Exclusion rules pair a condition
//! with the tools a given environment is known not to ship; the first rule
//! that matches a tool decides that it must be absent.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{ExclusionRule, ExpectedFailure};
use crate::env::CiEnvironment;
use crate::platform::HostSystem;

/// Environment predicate. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<HostSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_system: Option<HostSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_platform: Option<String>,
}

fn field_matches(expected: &Option<String>, actual: &Option<String>) -> bool {
    match expected {
        Some(expected) => actual.as_deref() == Some(expected.as_str()),
        None => true,
    }
}

impl Condition {
    pub fn matches(&self, env: &CiEnvironment) -> bool {
        field_matches(&self.os_id, &env.os_id)
            && field_matches(&self.build_system, &env.build_system)
            && field_matches(&self.project_platform, &env.project_platform)
            && self.system.map_or(true, |s| s == env.system)
            && self.not_system.map_or(true, |s| s != env.system)
            && self.asan.map_or(true, |a| a == env.asan)
    }
}

/// What the existence check should assert for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    MustExist,
    MustNotExist { reason: String, issues: Vec<u32> },
}

/// Expand `{tool}`, `{os_id}` and `{build_system}` in a reason template
pub fn render_reason(template: &str, tool: &str, env: &CiEnvironment) -> String {
    template
        .replace("{tool}", tool)
        .replace("{os_id}", env.os_id_display())
        .replace("{build_system}", env.build_system_display())
}

pub fn decide_existence(tool: &str, rules: &[ExclusionRule], env: &CiEnvironment) -> Expectation {
    let matched = rules
        .iter()
        .find(|rule| rule.tools.iter().any(|t| t == tool) && rule.when.matches(env));

    match matched {
        Some(rule) => {
            let reason = render_reason(&rule.reason, tool, env);
            tracing::debug!(tool, reason = %reason, "Tool excluded in this environment");
            Expectation::MustNotExist {
                reason,
                issues: rule.issues.clone(),
            }
        }
        None => Expectation::MustExist,
    }
}

/// Reason for an expected failure, when one applies in `env`
pub fn expected_failure(xfail: Option<&ExpectedFailure>, env: &CiEnvironment) -> Option<String> {
    xfail
        .filter(|x| x.when.matches(env))
        .map(|x| x.reason.clone())
}
