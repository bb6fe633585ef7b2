use std::time::{Duration, Instant};

use chrono::Utc;
use globset::{Glob, GlobSetBuilder};

use crate::check::{Check, CheckContext};
use crate::checks::{ExistenceCheck, FormatCheck, VersionCheck};
use crate::config::SmokeConfig;
use crate::errors::{Result, SmokeError};
use crate::outcome::Summary;
use crate::report::{CheckResult, Report};

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Holds the registered checks and runs them in priority order.
pub struct SmokeRunner {
    checks: Vec<Box<dyn Check>>,
    ctx: CheckContext,
}

impl SmokeRunner {
    pub fn new(ctx: CheckContext) -> Self {
        Self {
            checks: Vec::new(),
            ctx,
        }
    }

    /// Register the whole suite described by `config`
    pub fn from_config(config: &SmokeConfig, ctx: CheckContext) -> Self {
        let mut runner = Self::new(ctx);
        for tool in &config.tools {
            let check = ExistenceCheck::new(tool, &config.exclusions, &runner.ctx.env);
            runner.register(Box::new(check));
        }
        for target in &config.formats {
            runner.register(Box::new(FormatCheck::new(target.clone())));
        }
        runner.register(Box::new(VersionCheck::new()));
        runner
    }

    pub fn register(&mut self, check: Box<dyn Check>) {
        tracing::trace!(check = %check.id(), "Registering check");
        self.checks.push(check);
        self.sort_checks();
    }

    /// Highest priority first; registration order within a priority
    fn sort_checks(&mut self) {
        self.checks.sort_by_key(|c| std::cmp::Reverse(c.priority()));
    }

    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    /// Keep only checks whose id matches one of the glob patterns.
    /// An empty pattern list keeps everything.
    pub fn select(&mut self, patterns: &[String]) -> Result<()> {
        if patterns.is_empty() {
            return Ok(());
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        let set = builder.build()?;
        self.checks.retain(|c| set.is_match(c.id()));

        if self.checks.is_empty() {
            return Err(SmokeError::NoChecksSelected(patterns.to_vec()));
        }
        tracing::debug!(selected = self.checks.len(), "Applied check filter");
        Ok(())
    }

    /// `(id, description)` for every registered check, without running any
    pub fn plan(&self) -> Vec<(String, String)> {
        self.checks
            .iter()
            .map(|c| (c.id(), c.describe(&self.ctx)))
            .collect()
    }

    /// Run every check sequentially. Failures are recorded, never propagated.
    pub async fn run(&self) -> Report {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let id = check.id();
            let start = Instant::now();
            let outcome = check.run(&self.ctx).await;
            let elapsed = start.elapsed();

            if outcome.is_failure() {
                tracing::warn!(check = %id, outcome = %outcome, "Check failed");
            } else {
                tracing::info!(check = %id, outcome = %outcome, "Check finished");
            }

            results.push(CheckResult {
                id,
                outcome,
                duration_ms: millis(elapsed),
            });
        }

        let summary = Summary::from_outcomes(results.iter().map(|r| &r.outcome));
        Report {
            started_at,
            environment: self.ctx.env.clone(),
            dot: self.ctx.runner.program().display().to_string(),
            results,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::{ci_env, context, FakeLocator};
    use crate::outcome::Outcome;
    use crate::rules::Expectation;
    use std::path::Path;

    fn runner(env_os: Option<&str>, build_system: Option<&str>, tools: &[&str]) -> SmokeRunner {
        let config = SmokeConfig::builtin().unwrap();
        let ctx = context(
            ci_env(env_os, build_system),
            FakeLocator::with(tools),
            Path::new("/nonexistent/dot"),
        );
        SmokeRunner::from_config(&config, ctx)
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_registration_order() {
        let runner = runner(None, None, &[]);
        let ids: Vec<String> = runner.checks().iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 42 + 2 + 1);
        assert_eq!(ids[0], "existence::acyclic");
        assert_eq!(ids[41], "existence::vimdot");
        assert_eq!(ids[42], "format::png:gd");
        assert_eq!(ids[43], "format::svgz");
        assert_eq!(ids[44], "version");
    }

    #[test]
    fn test_only_centos_smyrna_is_excluded() {
        let runner = runner(Some("centos"), Some("autotools"), &[]);
        let excluded: Vec<String> = runner
            .checks()
            .iter()
            .filter(|c| {
                c.as_any()
                    .downcast_ref::<ExistenceCheck>()
                    .map_or(false, |e| e.expectation() != &Expectation::MustExist)
            })
            .map(|c| c.id())
            .collect();
        assert_eq!(excluded, vec!["existence::smyrna"]);
    }

    #[test]
    fn test_select_by_glob() {
        let mut runner = runner(None, None, &[]);
        runner
            .select(&["existence::gv*".to_string(), "version".to_string()])
            .unwrap();
        let ids: Vec<String> = runner.checks().iter().map(|c| c.id()).collect();
        assert_eq!(
            ids,
            vec![
                "existence::gv2gml",
                "existence::gv2gxl",
                "existence::gvcolor",
                "existence::gvedit",
                "existence::gvgen",
                "existence::gvmap",
                "existence::gvmap.sh",
                "existence::gvpack",
                "existence::gvpr",
                "version",
            ]
        );
    }

    #[test]
    fn test_select_without_match() {
        let mut runner = runner(None, None, &[]);
        let result = runner.select(&["nothing::*".to_string()]);
        assert!(matches!(result, Err(SmokeError::NoChecksSelected(_))));
    }

    #[test]
    fn test_select_invalid_glob() {
        let mut runner = runner(None, None, &[]);
        let result = runner.select(&["existence::[".to_string()]);
        assert!(matches!(result, Err(SmokeError::FilterError(_))));
    }

    #[test]
    fn test_plan_lists_expectations() {
        let mut runner = runner(Some("ubuntu"), Some("cmake"), &[]);
        runner.select(&["existence::mingle".to_string()]).unwrap();
        assert_eq!(
            runner.plan(),
            vec![(
                "existence::mingle".to_string(),
                "must be absent (mingle is not built for ubuntu (#1835))".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_run_records_every_check() {
        let mut runner = runner(Some("ubuntu"), Some("autotools"), &["dot", "neato"]);
        runner
            .select(&[
                "existence::dot".to_string(),
                "existence::neato".to_string(),
                "existence::mingle".to_string(),
                "existence::sfdp".to_string(),
                "version".to_string(),
            ])
            .unwrap();
        let report = runner.run().await;

        let outcomes: Vec<&Outcome> = report.results.iter().map(|r| &r.outcome).collect();
        assert_eq!(outcomes[0], &Outcome::Passed);
        assert_eq!(
            outcomes[1],
            &Outcome::Skipped("mingle is not built for ubuntu (#1835)".into())
        );
        assert_eq!(outcomes[2], &Outcome::Passed);
        assert_eq!(
            outcomes[3],
            &Outcome::Failed("sfdp was not found on PATH".into())
        );
        assert!(outcomes[4].is_failure());

        assert_eq!(report.summary.passed, 2);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.skipped, 1);
        assert!(!report.summary.is_success());
    }
}
