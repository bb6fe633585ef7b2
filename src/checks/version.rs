use std::any::Any;

use async_trait::async_trait;

use crate::check::{Check, CheckContext};
use crate::outcome::Outcome;

/// Token index of the version in `dot - graphviz version 2.49.0 (20210828.1703)`
const VERSION_TOKEN: usize = 4;

/// Extract the version from a `-V` report
pub fn parse_version_report(report: &str) -> Option<&str> {
    report.split_whitespace().nth(VERSION_TOKEN)
}

/// Checks that `dot -V` reports the expected version.
#[derive(Debug, Default)]
pub struct VersionCheck;

impl VersionCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for VersionCheck {
    fn id(&self) -> String {
        "version".to_string()
    }

    fn priority(&self) -> i32 {
        10
    }

    fn describe(&self, ctx: &CheckContext) -> String {
        match ctx.expected_version() {
            Some(version) => format!("-V must report {}", version),
            None => "-V must report $GV_VERSION (unset)".to_string(),
        }
    }

    async fn run(&self, ctx: &CheckContext) -> Outcome {
        let Some(expected) = ctx.expected_version() else {
            return Outcome::Failed(
                "GV_VERSION is not set and no expected version was given".to_string(),
            );
        };

        let output = match ctx.runner.version_report().await {
            Ok(output) => output,
            Err(e) => return Outcome::Failed(e.to_string()),
        };
        let report = output.merged();
        if !output.success {
            return Outcome::Failed(format!(
                "{} -V exited with {:?}: {}",
                ctx.runner.program().display(),
                output.code,
                report.trim()
            ));
        }

        match parse_version_report(&report) {
            None => Outcome::Failed(format!("malformed version string: {:?}", report.trim())),
            Some(actual) if actual == expected => {
                tracing::debug!(version = actual, "Version matches");
                Outcome::Passed
            }
            Some(actual) => Outcome::Failed(format!(
                "expected version {}, got {}",
                expected, actual
            )),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_report() {
        assert_eq!(
            parse_version_report("dot - graphviz version 2.49.0 (20210828.1703)\n"),
            Some("2.49.0")
        );
        assert_eq!(parse_version_report("dot - graphviz version"), None);
        assert_eq!(parse_version_report(""), None);
    }

    #[cfg(unix)]
    mod with_stub {
        use super::super::*;
        use crate::checks::test_support::{ci_env, context, write_stub, FakeLocator};

        const DOT_V: &str = r#"echo "dot - graphviz version 2.49.0 (20210828.1703)" >&2"#;

        #[tokio::test]
        async fn test_matching_version_passes() {
            let dir = tempfile::tempdir().unwrap();
            let dot = write_stub(dir.path(), "dot", DOT_V);
            let mut env = ci_env(None, None);
            env.gv_version = Some("2.49.0".into());
            let ctx = context(env, FakeLocator::default(), &dot);
            assert_eq!(VersionCheck::new().run(&ctx).await, Outcome::Passed);
        }

        #[tokio::test]
        async fn test_override_wins_over_env() {
            let dir = tempfile::tempdir().unwrap();
            let dot = write_stub(dir.path(), "dot", DOT_V);
            let mut env = ci_env(None, None);
            env.gv_version = Some("2.49.0".into());
            let mut ctx = context(env, FakeLocator::default(), &dot);
            ctx.expected_version = Some("2.50.0".into());
            assert_eq!(
                VersionCheck::new().run(&ctx).await,
                Outcome::Failed("expected version 2.50.0, got 2.49.0".into())
            );
        }

        #[tokio::test]
        async fn test_malformed_report() {
            let dir = tempfile::tempdir().unwrap();
            let dot = write_stub(dir.path(), "dot", "echo 'dot version'");
            let mut ctx = context(ci_env(None, None), FakeLocator::default(), &dot);
            ctx.expected_version = Some("2.49.0".into());
            match VersionCheck::new().run(&ctx).await {
                Outcome::Failed(msg) => assert!(msg.starts_with("malformed version string")),
                other => panic!("expected failure, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_missing_expected_version() {
            let dir = tempfile::tempdir().unwrap();
            let dot = write_stub(dir.path(), "dot", DOT_V);
            let ctx = context(ci_env(None, None), FakeLocator::default(), &dot);
            let check = VersionCheck::new();
            assert_eq!(check.describe(&ctx), "-V must report $GV_VERSION (unset)");
            assert!(check.run(&ctx).await.is_failure());
        }
    }
}
