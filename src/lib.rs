pub mod app;
pub mod check;
pub mod checks;
pub mod cli;
pub mod config;
pub mod env;
pub mod errors;
pub mod logging;
pub mod outcome;
pub mod platform;
pub mod process;
pub mod report;
pub mod rules;
pub mod runner;

pub use check::{Check, CheckContext};
pub use config::SmokeConfig;
pub use env::CiEnvironment;
pub use errors::{Result, SmokeError};
pub use outcome::{Outcome, Summary};
pub use runner::SmokeRunner;
