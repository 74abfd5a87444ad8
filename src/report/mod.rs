pub mod json;
pub mod types;

pub use types::{RunReport, RunSummary};

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::engine::state::RunStatus;

/// Load a previously saved JSON report
pub fn load_report(path: &Path) -> Result<RunReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))?;
    let report: RunReport =
        serde_json::from_str(&content).context("Failed to parse report JSON")?;
    Ok(report)
}

/// Print a per-scenario status table plus the run totals
pub fn print_summary(report: &RunReport) {
    println!("\nRun {}", report.run_id.cyan());
    for result in &report.results {
        let status = match result.status {
            RunStatus::Passed => "PASSED".green().bold(),
            RunStatus::Failed => "FAILED".red().bold(),
            RunStatus::Errored => "ERRORED".yellow().bold(),
            _ => "UNKNOWN".white().bold(),
        };
        println!(
            "  [{}] {} ({}ms)",
            status,
            result.scenario,
            result.duration_ms
        );
        if let Some(message) = &result.message {
            println!("      {}", message.red());
        }
        for soft in &result.soft_errors {
            println!("      {} {}", "ℹ".yellow(), soft.dimmed());
        }
    }

    let s = &report.summary;
    println!(
        "\n  {} scenarios: {} passed, {} failed, {} errored ({}ms)",
        s.total,
        s.passed.to_string().green(),
        s.failed.to_string().red(),
        s.errored.to_string().yellow(),
        s.duration_ms
    );
}
