use thiserror::Error;

/// Failure taxonomy for scenario execution.
///
/// Soft navigation failures are not represented here. They are recorded in
/// the run's diagnostic log and never abort execution.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The browser session could not be created. Fatal, never retried.
    #[error("failed to launch browser session: {source:#}")]
    Launch {
        #[source]
        source: anyhow::Error,
    },

    /// No element matched the locator. Retriable by the caller; a miss
    /// that survives every retry becomes the cause of an ActionTimeout.
    #[error("no element matched {locator}")]
    ResolutionMiss { locator: String },

    /// An action did not succeed within its timeout.
    #[error("step {step}: {action} on {locator} timed out after {timeout_ms}ms ({cause})")]
    ActionTimeout {
        step: usize,
        action: String,
        locator: String,
        timeout_ms: u64,
        cause: String,
    },

    /// An assertion did not hold within its timeout. Carries the
    /// scenario-authored diagnostic verbatim when one was supplied.
    #[error("step {step}: {message}")]
    Assertion { step: usize, message: String },

    /// Anything outside the taxonomy above, e.g. a lost session.
    #[error("step {step}: unexpected fault: {source:#}")]
    Fault {
        step: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    /// True for failures that yield a Failed verdict. Launch errors and
    /// faults yield Errored instead.
    pub fn is_test_failure(&self) -> bool {
        matches!(
            self,
            EngineError::ResolutionMiss { .. }
                | EngineError::ActionTimeout { .. }
                | EngineError::Assertion { .. }
        )
    }
}
