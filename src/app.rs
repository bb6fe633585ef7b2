use std::ffi::OsString;

use crate::check::CheckContext;
use crate::cli::Args;
use crate::config::SmokeConfig;
use crate::env::{CiEnvironment, EnvManager};
use crate::errors::Result;
use crate::platform::{get_tool_locator, resolve_program};
use crate::process::ToolRunner;
use crate::runner::SmokeRunner;

/// What the binary prints on stdout, and the process exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub output: String,
    pub exit_code: i32,
}

/// Run the suite as configured by `args`. Configuration problems are
/// errors; failing checks are reported through the exit code.
pub async fn execute(args: Args) -> Result<Completion> {
    if args.print_schema {
        return Ok(Completion {
            output: SmokeConfig::generate_schema(),
            exit_code: 0,
        });
    }

    let config = SmokeConfig::load(args.config.as_deref())?;

    let mut env_manager = EnvManager::new();
    env_manager.merge_env_files(&args.env_files)?;
    let env = CiEnvironment::capture(&env_manager, &config.asan_jobs);

    let search_path = args
        .path
        .clone()
        .map(OsString::from)
        .or_else(|| std::env::var_os("PATH"))
        .unwrap_or_default();
    let locator = get_tool_locator(search_path)?;

    let dot = args.dot.clone().unwrap_or_else(|| config.dot.clone());
    let program = resolve_program(locator.as_ref(), &dot);
    tracing::debug!(dot = %program.display(), "Resolved dot binary");

    let ctx = CheckContext {
        env,
        locator,
        runner: ToolRunner::new(program, args.timeout),
        expected_version: args.expect_version.clone(),
    };

    let mut runner = SmokeRunner::from_config(&config, ctx);
    runner.select(&args.filters)?;

    if args.list {
        let output = runner
            .plan()
            .into_iter()
            .map(|(id, description)| format!("{}: {}\n", id, description))
            .collect();
        return Ok(Completion {
            output,
            exit_code: 0,
        });
    }

    let report = runner.run().await;
    let output = if args.json {
        report.to_json()?
    } else {
        report.render_human()
    };
    Ok(Completion {
        output,
        exit_code: report.exit_code(),
    })
}
