use std::any::Any;

use async_trait::async_trait;

use crate::env::CiEnvironment;
use crate::outcome::Outcome;
use crate::platform::ToolLocator;
use crate::process::ToolRunner;

/// Everything a check may consult while running
pub struct CheckContext {
    pub env: CiEnvironment,
    pub locator: Box<dyn ToolLocator>,
    pub runner: ToolRunner,
    /// Overrides `GV_VERSION` when set
    pub expected_version: Option<String>,
}

impl CheckContext {
    pub fn expected_version(&self) -> Option<&str> {
        self.expected_version
            .as_deref()
            .or(self.env.gv_version.as_deref())
    }
}

/// A single smoke check. Checks are independent: a failure is reported in
/// the returned [`Outcome`] and never stops the run.
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable identifier, e.g. `existence::dot`
    fn id(&self) -> String;

    /// Higher priorities run first
    fn priority(&self) -> i32 {
        0
    }

    /// What the check will assert in this environment
    fn describe(&self, ctx: &CheckContext) -> String;

    async fn run(&self, ctx: &CheckContext) -> Outcome;

    fn as_any(&self) -> &dyn Any;
}
