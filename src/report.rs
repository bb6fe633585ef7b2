use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::Serialize;

use crate::env::CiEnvironment;
use crate::errors::Result;
use crate::outcome::{Outcome, Summary};

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub environment: CiEnvironment,
    pub dot: String,
    pub results: Vec<CheckResult>,
    pub summary: Summary,
}

fn outcome_color(outcome: &Outcome) -> Color {
    match outcome {
        Outcome::Passed => Color::Green,
        Outcome::Failed(_) => Color::Red,
        Outcome::Skipped(_) | Outcome::XFailed(_) => Color::Yellow,
        Outcome::XPassed { strict: true, .. } => Color::Red,
        Outcome::XPassed { .. } => Color::Yellow,
    }
}

impl Report {
    pub fn exit_code(&self) -> i32 {
        if self.summary.is_success() {
            0
        } else {
            1
        }
    }

    pub fn render_human(&self) -> String {
        let mut out = String::new();
        let env = &self.environment;
        out.push_str(&format!(
            "{} os={} build_system={} system={}{}\n",
            "gvsmoke".bold(),
            env.os_id_display(),
            env.build_system_display(),
            env.system,
            if env.asan { " asan" } else { "" }
        ));

        for result in &self.results {
            let tag = format!("{:<7}", result.outcome.label()).color(outcome_color(&result.outcome));
            match result.outcome.detail() {
                Some(detail) => out.push_str(&format!("{} {} - {}\n", tag, result.id, detail)),
                None => out.push_str(&format!("{} {}\n", tag, result.id)),
            }
        }

        let summary = self.summary.to_string();
        let summary = if self.summary.is_success() {
            summary.green()
        } else {
            summary.red()
        };
        out.push_str(&format!("{} {}\n", "=====".dimmed(), summary.bold()));
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
