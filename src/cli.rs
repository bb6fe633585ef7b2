use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

fn parse_timeout(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s).map_err(|e| format!("invalid duration '{}': {}", s, e))
}

#[derive(Parser, Debug)]
#[command(name = "gvsmoke")]
#[command(version)]
#[command(about = "Smoke-test a Graphviz installation in CI", long_about = None)]
pub struct Args {
    /// Suite definition (YAML); defaults to the built-in suite
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dotenv file(s) providing OS_ID, build_system, GV_VERSION, ...
    #[arg(long = "env-file")]
    pub env_files: Vec<PathBuf>,

    /// Only run checks whose id matches this glob (repeatable)
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Layout binary used for format and version checks
    #[arg(long)]
    pub dot: Option<String>,

    /// Search path used instead of $PATH
    #[arg(long)]
    pub path: Option<String>,

    /// Expected version, overriding $GV_VERSION
    #[arg(long)]
    pub expect_version: Option<String>,

    /// Per-invocation timeout, e.g. "30s" or "2m"
    #[arg(long, value_parser = parse_timeout, default_value = "30s")]
    pub timeout: Duration,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// List checks and their expectations without running them
    #[arg(short, long)]
    pub list: bool,

    /// Print the JSON schema of the suite definition and exit
    #[arg(long)]
    pub print_schema: bool,

    /// Increase log verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
