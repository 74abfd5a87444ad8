use std::time::{Duration, Instant};

use crate::config::RunnerConfig;
use crate::driver::traits::BrowserDriver;
use crate::engine::locator;
use crate::error::EngineError;
use crate::parser::types::LocatorRef;

/// Element interactions the executor can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Fill,
    Scroll,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::Scroll => "scroll",
        }
    }
}

/// Outcome of a single attempt. Soft failures are retried until the
/// step's deadline; fatal ones abort immediately.
enum AttemptError {
    Soft(String),
    Fatal(EngineError),
}

/// Retries an action until it succeeds or its timeout elapses.
///
/// The locator is re-resolved on every attempt, so an element that
/// appears, moves or is re-rendered mid-poll is picked up the next time
/// around. At least one attempt always runs, even with a zero timeout.
pub struct ActionExecutor<'a> {
    driver: &'a dyn BrowserDriver,
    config: &'a RunnerConfig,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, config: &'a RunnerConfig) -> Self {
        Self { driver, config }
    }

    pub async fn perform(
        &self,
        step: usize,
        kind: ActionKind,
        locator: &LocatorRef,
        value: Option<&str>,
        timeout_ms: u64,
    ) -> Result<(), EngineError> {
        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }

        let start = Instant::now();
        let deadline = Duration::from_millis(timeout_ms);
        let mut interval = self.config.poll_initial_interval_ms;
        let mut last_cause = String::new();

        loop {
            match self.attempt(step, kind, locator, value).await {
                Ok(()) => return Ok(()),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Soft(cause)) => last_cause = cause,
            }

            if start.elapsed() >= deadline {
                return Err(EngineError::ActionTimeout {
                    step,
                    action: kind.as_str().to_string(),
                    locator: locator.to_string(),
                    timeout_ms,
                    cause: last_cause,
                });
            }

            tokio::time::sleep(Duration::from_millis(interval)).await;
            interval = (interval * 3 / 2).min(self.config.poll_max_interval_ms);
        }
    }

    async fn attempt(
        &self,
        step: usize,
        kind: ActionKind,
        locator: &LocatorRef,
        value: Option<&str>,
    ) -> Result<(), AttemptError> {
        let resolved = match locator::resolve(self.driver, locator).await {
            Ok(Some(r)) => r,
            Ok(None) => {
                return Err(AttemptError::Soft(
                    EngineError::ResolutionMiss {
                        locator: locator.to_string(),
                    }
                    .to_string(),
                ))
            }
            Err(e) => return Err(AttemptError::Fatal(EngineError::Fault { step, source: e })),
        };

        let dispatched = match kind {
            ActionKind::Click => {
                self.driver
                    .click(resolved.frame, &resolved.query, resolved.index)
                    .await
            }
            ActionKind::Fill => {
                self.driver
                    .fill(
                        resolved.frame,
                        &resolved.query,
                        resolved.index,
                        value.unwrap_or_default(),
                    )
                    .await
            }
            ActionKind::Scroll => {
                self.driver
                    .scroll_into_view(resolved.frame, &resolved.query, resolved.index)
                    .await
            }
        };

        match dispatched {
            Ok(true) => Ok(()),
            // matched during resolution but gone by dispatch time
            Ok(false) => Err(AttemptError::Soft(
                EngineError::ResolutionMiss {
                    locator: locator.to_string(),
                }
                .to_string(),
            )),
            Err(e) => Err(AttemptError::Soft(format!(
                "{} failed: {:#}",
                kind.as_str(),
                e
            ))),
        }
    }
}
