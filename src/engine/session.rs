use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::driver::{BrowserDriver, PlaywrightDriver};
use crate::error::EngineError;

/// A live browser session: one driver plus its release state.
///
/// Release is idempotent. The first call tears the driver down; later calls
/// are no-ops. Teardown failures are logged and swallowed, never returned.
pub struct Session {
    id: String,
    driver: Arc<dyn BrowserDriver>,
    released: AtomicBool,
}

impl Session {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            driver,
            released: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver(&self) -> &dyn BrowserDriver {
        self.driver.as_ref()
    }

    /// Tear the session down. Safe to call any number of times.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("releasing session {}", self.id);
        if let Err(e) = self.driver.close().await {
            warn!("session {} teardown failed: {:#}", self.id, e);
        }
    }

    #[cfg(test)]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Creates sessions on demand. Sessions are independent; acquiring one
/// never blocks on or observes another.
pub struct SessionManager {
    config: RunnerConfig,
}

impl SessionManager {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Launch a browser and wrap it in a fresh session
    pub async fn acquire(&self) -> Result<Session, EngineError> {
        let driver = PlaywrightDriver::launch(&self.config)
            .await
            .map_err(|source| EngineError::Launch { source })?;
        let session = Session::new(Arc::new(driver));
        debug!(
            "session {} acquired ({} driver)",
            session.id(),
            session.driver().name()
        );
        Ok(session)
    }
}
