pub mod action;
pub mod assertion;
pub mod events;
pub mod locator;
pub mod navigation;
pub mod runner;
pub mod session;
pub mod state;

pub use events::{ConsoleEventListener, EventEmitter, RunEvent};
pub use runner::ScenarioRunner;
pub use session::{Session, SessionManager};
pub use state::{ExecutionResult, RunStatus};

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::parser::{collect_scenario_files, parse_scenario_file, Scenario};
use crate::report::types::{RunReport, RunSummary};

/// Options for one run invocation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Keep only scenarios carrying at least one of these tags
    pub tags: Vec<String>,
    /// One browser session per scenario, all in flight at once
    pub parallel: bool,
}

/// Load scenarios from `path` and execute them, streaming progress to the
/// console and returning the aggregated report.
pub async fn run_scenarios(
    path: &Path,
    options: &RunOptions,
    config: RunnerConfig,
) -> Result<RunReport> {
    let files = collect_scenario_files(path)?;
    if files.is_empty() {
        bail!("No scenario files found under {}", path.display());
    }

    let mut scenarios: Vec<Scenario> = Vec::new();
    for file in &files {
        let scenario = parse_scenario_file(file)?;
        if matches_tags(&scenario, &options.tags) {
            scenarios.push(scenario);
        }
    }
    if scenarios.is_empty() {
        bail!("No scenarios matched tags: {}", options.tags.join(", "));
    }

    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let start = Instant::now();

    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    emitter.emit(RunEvent::RunStarted {
        run_id: run_id.clone(),
        scenario_count: scenarios.len(),
    });

    let results = if options.parallel {
        let mut handles = Vec::new();
        for scenario in scenarios {
            let runner = ScenarioRunner::new(config.clone(), emitter.clone());
            handles.push(tokio::spawn(async move { runner.run(&scenario).await }));
        }
        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => warn!("scenario task panicked: {}", e),
            }
        }
        results
    } else {
        let runner = ScenarioRunner::new(config.clone(), emitter.clone());
        let mut results = Vec::new();
        for scenario in &scenarios {
            results.push(runner.run(scenario).await);
        }
        results
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    let summary = RunSummary::from_results(&results, duration_ms);

    emitter.emit(RunEvent::RunFinished {
        passed: summary.passed,
        failed: summary.failed,
        errored: summary.errored,
        duration_ms,
    });

    // closing the channel lets the listener drain and exit
    drop(emitter);
    let _ = listener.await;

    Ok(RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        summary,
        results,
    })
}

fn matches_tags(scenario: &Scenario, tags: &[String]) -> bool {
    tags.is_empty() || scenario.tags.iter().any(|t| tags.contains(t))
}
