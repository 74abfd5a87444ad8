use std::collections::HashMap;
use std::time::Duration;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::broadcast;

use crate::engine::state::RunStatus;

/// Execution events for real-time console updates
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        scenario_count: usize,
    },
    RunFinished {
        passed: usize,
        failed: usize,
        errored: usize,
        duration_ms: u64,
    },

    ScenarioStarted {
        scenario: String,
        step_count: usize,
    },
    ScenarioFinished {
        scenario: String,
        status: RunStatus,
        duration_ms: u64,
    },

    StepStarted {
        scenario: String,
        index: usize,
        label: String,
    },
    StepPassed {
        scenario: String,
        index: usize,
        duration_ms: u64,
    },
    StepFailed {
        scenario: String,
        index: usize,
        error: String,
        duration_ms: u64,
    },
    StepSkipped {
        scenario: String,
        index: usize,
        label: String,
    },

    SoftError {
        scenario: String,
        message: String,
    },
}

/// Broadcast emitter. Sending never blocks; events are dropped when no
/// listener is attached.
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<RunEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<RunEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

/// Console listener: one spinner per in-flight step, keyed by scenario so
/// concurrent runs interleave cleanly.
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<RunEvent>) {
        use std::io::IsTerminal;

        // Hidden target when piped, so escape codes don't leak into logs
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinners: HashMap<String, ProgressBar> = HashMap::new();
        let mut step_texts: HashMap<String, String> = HashMap::new();

        while let Ok(event) = receiver.recv().await {
            match event {
                RunEvent::RunStarted {
                    run_id,
                    scenario_count,
                } => {
                    multi
                        .println(format!(
                            "\n{} Run {} ({} scenarios)",
                            "▶".green().bold(),
                            run_id.cyan(),
                            scenario_count
                        ))
                        .ok();
                }

                RunEvent::RunFinished {
                    passed,
                    failed,
                    errored,
                    duration_ms,
                } => {
                    for pb in spinners.drain().map(|(_, pb)| pb) {
                        pb.finish();
                    }
                    tokio::time::sleep(Duration::from_millis(200)).await;

                    println!("\n{} Run finished", "■".blue().bold());
                    println!(
                        "  {} passed, {} failed, {} errored",
                        passed.to_string().green(),
                        failed.to_string().red(),
                        errored.to_string().yellow()
                    );
                    println!("  Duration: {}ms", duration_ms);
                }

                RunEvent::ScenarioStarted {
                    scenario,
                    step_count,
                } => {
                    println!(
                        "\n  {} Scenario: {} ({} steps)",
                        "→".blue(),
                        scenario.white().bold(),
                        step_count
                    );
                }

                RunEvent::ScenarioFinished {
                    scenario,
                    status,
                    duration_ms,
                } => {
                    if let Some(pb) = spinners.remove(&scenario) {
                        pb.finish();
                    }
                    let status_str = match status {
                        RunStatus::Passed => "PASSED".green().bold(),
                        RunStatus::Failed => "FAILED".red().bold(),
                        RunStatus::Errored => "ERRORED".yellow().bold(),
                        _ => "UNKNOWN".white().bold(),
                    };
                    println!("  {} {} [{}] {}ms", "←".blue(), scenario, status_str, duration_ms);
                }

                RunEvent::StepStarted {
                    scenario,
                    index,
                    label,
                } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    let style = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}");
                    if let Ok(style) = style {
                        pb.set_style(style);
                    }

                    let body = format!("[{}] {}... ", index, label.dimmed());
                    pb.set_message(body.clone());
                    pb.enable_steady_tick(Duration::from_millis(100));

                    spinners.insert(scenario.clone(), pb);
                    step_texts.insert(scenario, body);
                }

                RunEvent::StepPassed {
                    scenario,
                    duration_ms,
                    ..
                } => {
                    let text = step_texts.remove(&scenario).unwrap_or_default();
                    let done = format!("    {} {}({}ms)", "✓".green(), text, duration_ms);
                    if let Some(pb) = spinners.remove(&scenario) {
                        pb.finish_and_clear();
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                    println!("{}", done);
                }

                RunEvent::StepFailed {
                    scenario,
                    error,
                    duration_ms,
                    ..
                } => {
                    let text = step_texts.remove(&scenario).unwrap_or_default();
                    if let Some(pb) = spinners.remove(&scenario) {
                        pb.finish_and_clear();
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                    println!("    {} {}({}ms)", "✗".red(), text, duration_ms);
                    println!("      {}", error.red());
                }

                RunEvent::StepSkipped { index, label, .. } => {
                    println!("    {} [{}] {}", "○".yellow(), index, label.dimmed());
                }

                RunEvent::SoftError { message, .. } => {
                    multi
                        .println(format!("      {} {}", "ℹ".yellow(), message.dimmed()))
                        .ok();
                }
            }
        }
    }
}
