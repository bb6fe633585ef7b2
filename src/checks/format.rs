use std::any::Any;

use async_trait::async_trait;

use crate::check::{Check, CheckContext};
use crate::config::FormatTarget;
use crate::outcome::Outcome;
use crate::rules::expected_failure;

/// Renders a trivial graph through the layout binary in one output format.
pub struct FormatCheck {
    target: FormatTarget,
}

impl FormatCheck {
    pub fn new(target: FormatTarget) -> Self {
        Self { target }
    }

    async fn render(&self, ctx: &CheckContext) -> Outcome {
        match ctx.runner.render(&self.target.format, &self.target.source).await {
            Ok(output) if output.success => Outcome::Passed,
            Ok(output) => Outcome::Failed(format!(
                "{} -T{} exited with {}: {}",
                ctx.runner.program().display(),
                self.target.format,
                output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                output.stderr_lossy()
            )),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

#[async_trait]
impl Check for FormatCheck {
    fn id(&self) -> String {
        format!("format::{}", self.target.format)
    }

    fn priority(&self) -> i32 {
        50
    }

    fn describe(&self, ctx: &CheckContext) -> String {
        let mut description = format!("-T{} must render", self.target.format);
        if let Some(reason) = expected_failure(self.target.xfail.as_ref(), &ctx.env) {
            description.push_str(&format!(" (expected to fail: {})", reason));
        }
        description
    }

    async fn run(&self, ctx: &CheckContext) -> Outcome {
        let xfail = expected_failure(self.target.xfail.as_ref(), &ctx.env);
        let strict = self.target.xfail.as_ref().map_or(true, |x| x.strict);
        self.render(ctx).await.resolve_expected_failure(xfail, strict)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
