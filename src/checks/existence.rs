use std::any::Any;

use async_trait::async_trait;

use crate::check::{Check, CheckContext};
use crate::config::ExclusionRule;
use crate::env::CiEnvironment;
use crate::outcome::Outcome;
use crate::rules::{decide_existence, Expectation};

/// Asserts a tool is on the search path, or that an excluded tool is not.
pub struct ExistenceCheck {
    tool: String,
    expectation: Expectation,
}

impl ExistenceCheck {
    pub fn new(tool: &str, rules: &[ExclusionRule], env: &CiEnvironment) -> Self {
        Self {
            tool: tool.to_string(),
            expectation: decide_existence(tool, rules, env),
        }
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }
}

#[async_trait]
impl Check for ExistenceCheck {
    fn id(&self) -> String {
        format!("existence::{}", self.tool)
    }

    fn priority(&self) -> i32 {
        90
    }

    fn describe(&self, _ctx: &CheckContext) -> String {
        match &self.expectation {
            Expectation::MustExist => "must be on PATH".to_string(),
            Expectation::MustNotExist { reason, .. } => format!("must be absent ({})", reason),
        }
    }

    async fn run(&self, ctx: &CheckContext) -> Outcome {
        let found = ctx.locator.find(&self.tool);
        if let Some(path) = &found {
            tracing::debug!(tool = %self.tool, path = %path.display(), "Found tool");
        }

        match (&self.expectation, found) {
            (Expectation::MustExist, Some(_)) => Outcome::Passed,
            (Expectation::MustExist, None) => {
                Outcome::Failed(format!("{} was not found on PATH", self.tool))
            }
            (Expectation::MustNotExist { .. }, Some(_)) => Outcome::Failed(format!(
                "{} has been resurrected in the {} build on {}. Please remove skip.",
                self.tool,
                ctx.env.build_system_display(),
                ctx.env.os_id_display()
            )),
            (Expectation::MustNotExist { reason, .. }, None) => Outcome::Skipped(reason.clone()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
