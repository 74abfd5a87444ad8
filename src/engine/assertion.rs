use std::time::{Duration, Instant};

use crate::config::RunnerConfig;
use crate::driver::traits::BrowserDriver;
use crate::engine::locator;
use crate::error::EngineError;
use crate::parser::types::LocatorRef;

/// Visibility assertions with a bounded wait.
///
/// An element that is absent or hidden is polled for, not failed
/// outright: assertions usually race against rendering. Only when the
/// deadline passes does the assertion fail, carrying the scenario's own
/// diagnostic when one was authored.
pub struct AssertionEngine<'a> {
    driver: &'a dyn BrowserDriver,
    config: &'a RunnerConfig,
}

impl<'a> AssertionEngine<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, config: &'a RunnerConfig) -> Self {
        Self { driver, config }
    }

    pub async fn expect_visible(
        &self,
        step: usize,
        locator: &LocatorRef,
        timeout_ms: u64,
        message: Option<&str>,
    ) -> Result<(), EngineError> {
        let resolved = locator::compile(locator);
        let start = Instant::now();
        let deadline = Duration::from_millis(timeout_ms);
        let mut interval = self.config.poll_initial_interval_ms;

        loop {
            match self
                .driver
                .is_visible(resolved.frame, &resolved.query, resolved.index)
                .await
            {
                Ok(Some(true)) => return Ok(()),
                // hidden or not yet in the DOM, keep polling
                Ok(_) => {}
                Err(e) => return Err(EngineError::Fault { step, source: e }),
            }

            if start.elapsed() >= deadline {
                let message = match message {
                    Some(m) => m.to_string(),
                    None => format!("expected {} to be visible within {}ms", locator, timeout_ms),
                };
                return Err(EngineError::Assertion { step, message });
            }

            tokio::time::sleep(Duration::from_millis(interval)).await;
            interval = (interval * 3 / 2).min(self.config.poll_max_interval_ms);
        }
    }
}
