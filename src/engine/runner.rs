use anyhow::anyhow;
use log::{debug, info};

use crate::config::RunnerConfig;
use crate::engine::action::{ActionExecutor, ActionKind};
use crate::engine::assertion::AssertionEngine;
use crate::engine::events::{EventEmitter, RunEvent};
use crate::engine::navigation::NavigationController;
use crate::engine::session::{Session, SessionManager};
use crate::engine::state::{ExecutionResult, RunState, RunStatus, StepStatus};
use crate::error::EngineError;
use crate::parser::types::{LocatorRef, Scenario, Step, TargetParams};

/// Executes one scenario at a time against one session.
///
/// Steps run strictly in order. The first hard failure marks the step,
/// skips everything after it and settles the verdict: Failed when the
/// scenario's expectations did not hold, Errored when the harness broke.
/// Soft navigation diagnostics accumulate without affecting the verdict.
pub struct ScenarioRunner {
    config: RunnerConfig,
    emitter: EventEmitter,
}

impl ScenarioRunner {
    pub fn new(config: RunnerConfig, emitter: EventEmitter) -> Self {
        Self { config, emitter }
    }

    /// Acquire a session, run the scenario, release the session. Release
    /// happens on every path, including launch failure.
    pub async fn run(&self, scenario: &Scenario) -> ExecutionResult {
        let manager = SessionManager::new(self.config_for(scenario));
        let session = match manager.acquire().await {
            Ok(session) => session,
            Err(e) => return self.launch_failure(scenario, e),
        };

        let result = self.run_with_session(scenario, &session).await;
        session.release().await;
        result
    }

    /// Run against an already-acquired session. The caller keeps
    /// ownership of the session and its release.
    pub async fn run_with_session(
        &self,
        scenario: &Scenario,
        session: &Session,
    ) -> ExecutionResult {
        let config = self.config_for(scenario);
        let driver = session.driver();
        let navigation = NavigationController::new(driver, &config);
        let actions = ActionExecutor::new(driver, &config);
        let assertions = AssertionEngine::new(driver, &config);

        let mut state = RunState::new(scenario);
        state.start();
        info!(
            "scenario '{}' started on session {}",
            scenario.name,
            session.id()
        );
        self.emitter.emit(RunEvent::ScenarioStarted {
            scenario: scenario.name.clone(),
            step_count: scenario.steps.len(),
        });

        let mut verdict = RunStatus::Passed;

        for (index, step) in scenario.steps.iter().enumerate() {
            state.step_running(index);
            self.emitter.emit(RunEvent::StepStarted {
                scenario: scenario.name.clone(),
                index,
                label: step.label(),
            });

            let mut soft = Vec::new();
            let outcome = self
                .execute_step(index, step, &navigation, &actions, &assertions, &config, &mut soft)
                .await;

            for message in soft {
                self.emitter.emit(RunEvent::SoftError {
                    scenario: scenario.name.clone(),
                    message: message.clone(),
                });
                state.record_soft(message);
            }

            match outcome {
                Ok(()) => {
                    state.step_passed(index);
                    self.emitter.emit(RunEvent::StepPassed {
                        scenario: scenario.name.clone(),
                        index,
                        duration_ms: step_duration(&state, index),
                    });
                }
                Err(e) => {
                    let rendered = e.to_string();
                    debug!("scenario '{}' stopped: {}", scenario.name, rendered);
                    state.step_failed(index, rendered.clone());
                    self.emitter.emit(RunEvent::StepFailed {
                        scenario: scenario.name.clone(),
                        index,
                        error: rendered,
                        duration_ms: step_duration(&state, index),
                    });

                    state.skip_remaining();
                    for skipped in &state.steps {
                        if skipped.status == StepStatus::Skipped {
                            self.emitter.emit(RunEvent::StepSkipped {
                                scenario: scenario.name.clone(),
                                index: skipped.index,
                                label: skipped.label.clone(),
                            });
                        }
                    }

                    verdict = if e.is_test_failure() {
                        RunStatus::Failed
                    } else {
                        RunStatus::Errored
                    };
                    break;
                }
            }
        }

        state.finish(verdict);
        self.emitter.emit(RunEvent::ScenarioFinished {
            scenario: scenario.name.clone(),
            status: verdict,
            duration_ms: state.elapsed_ms(),
        });
        state.into_result()
    }

    async fn execute_step(
        &self,
        index: usize,
        step: &Step,
        navigation: &NavigationController<'_>,
        actions: &ActionExecutor<'_>,
        assertions: &AssertionEngine<'_>,
        config: &RunnerConfig,
        soft_errors: &mut Vec<String>,
    ) -> Result<(), EngineError> {
        match step {
            Step::Navigate(p) => navigation
                .navigate(&p.url, p.wait_until, p.timeout_ms, soft_errors)
                .await
                .map_err(|source| EngineError::Fault {
                    step: index,
                    source,
                }),
            Step::WaitForLoad(p) => {
                navigation
                    .wait_for_load(p.target, p.condition, p.timeout_ms, soft_errors)
                    .await;
                Ok(())
            }
            Step::Wait(p) => {
                tokio::time::sleep(std::time::Duration::from_millis(p.ms())).await;
                Ok(())
            }
            Step::Click(p) => {
                let locator = required_locator(index, p)?;
                actions
                    .perform(
                        index,
                        ActionKind::Click,
                        &locator,
                        None,
                        p.timeout_ms.unwrap_or(config.default_timeout_ms),
                    )
                    .await
            }
            Step::Fill(p) => {
                let locator = required_locator(index, &p.target)?;
                actions
                    .perform(
                        index,
                        ActionKind::Fill,
                        &locator,
                        Some(&p.value),
                        p.target.timeout_ms.unwrap_or(config.default_timeout_ms),
                    )
                    .await
            }
            Step::Scroll(p) => {
                let locator = required_locator(index, p)?;
                actions
                    .perform(
                        index,
                        ActionKind::Scroll,
                        &locator,
                        None,
                        p.timeout_ms.unwrap_or(config.default_timeout_ms),
                    )
                    .await
            }
            Step::AssertVisible(p) => {
                let locator = required_locator(index, &p.target)?;
                assertions
                    .expect_visible(
                        index,
                        &locator,
                        p.target.timeout_ms.unwrap_or(config.default_timeout_ms),
                        p.message.as_deref(),
                    )
                    .await
            }
        }
    }

    fn launch_failure(&self, scenario: &Scenario, error: EngineError) -> ExecutionResult {
        let mut state = RunState::new(scenario);
        state.start();
        self.emitter.emit(RunEvent::ScenarioStarted {
            scenario: scenario.name.clone(),
            step_count: scenario.steps.len(),
        });
        state.message = Some(error.to_string());
        state.skip_remaining();
        state.finish(RunStatus::Errored);
        self.emitter.emit(RunEvent::ScenarioFinished {
            scenario: scenario.name.clone(),
            status: RunStatus::Errored,
            duration_ms: state.elapsed_ms(),
        });
        state.into_result()
    }

    /// Per-run config: scenario metadata overrides runner defaults
    fn config_for(&self, scenario: &Scenario) -> RunnerConfig {
        let mut config = self.config.clone();
        if let Some(base) = &scenario.base_url {
            config.base_url = Some(base.clone());
        }
        if let Some(timeout) = scenario.default_timeout_ms {
            config.default_timeout_ms = timeout;
        }
        if let Some(settle) = scenario.settle_delay_ms {
            config.settle_delay_ms = settle;
        }
        config
    }
}

fn step_duration(state: &RunState, index: usize) -> u64 {
    state
        .steps
        .get(index)
        .and_then(|s| s.duration_ms)
        .unwrap_or(0)
}

fn required_locator(index: usize, target: &TargetParams) -> Result<LocatorRef, EngineError> {
    // parse-time validation normally guarantees this
    target.locator().ok_or_else(|| EngineError::Fault {
        step: index,
        source: anyhow!("step has no locator"),
    })
}
