use anyhow::Result;
use log::warn;

use crate::config::RunnerConfig;
use crate::driver::traits::{BrowserDriver, FrameTarget};
use crate::parser::types::{FrameScope, LoadCondition, LoadTarget, WaitUntil};

/// Navigation and load synchronization.
///
/// The commit is the only hard step: if the browser cannot reach the URL
/// at all, the error propagates. Everything after the commit is
/// best-effort, recorded as soft diagnostics and never aborting the run.
pub struct NavigationController<'a> {
    driver: &'a dyn BrowserDriver,
    config: &'a RunnerConfig,
}

impl<'a> NavigationController<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, config: &'a RunnerConfig) -> Self {
        Self { driver, config }
    }

    /// Navigate the active page. After the commit the active-page
    /// reference is re-synced and all frames get a bounded settle window.
    pub async fn navigate(
        &self,
        url: &str,
        wait_until: WaitUntil,
        timeout_ms: Option<u64>,
        soft_errors: &mut Vec<String>,
    ) -> Result<()> {
        let full_url = self.config.resolve_url(url);
        let timeout = timeout_ms.unwrap_or(self.config.navigation_timeout_ms);

        self.driver.goto(&full_url, wait_until, timeout).await?;

        if let Err(e) = self.driver.sync_active_page().await {
            record_soft(
                soft_errors,
                format!("active page sync after {} failed: {:#}", full_url, e),
            );
        }

        self.wait_for_load(
            LoadTarget::Scope(FrameScope::AllFrames),
            LoadCondition::DomContentLoaded,
            Some(self.config.frame_sync_timeout_ms),
            soft_errors,
        )
        .await;

        Ok(())
    }

    /// Wait for frames to reach a load condition. Timeouts and per-frame
    /// failures are isolated: one stuck frame never hides the state of
    /// the others, and nothing here returns an error.
    pub async fn wait_for_load(
        &self,
        target: LoadTarget,
        condition: LoadCondition,
        timeout_ms: Option<u64>,
        soft_errors: &mut Vec<String>,
    ) {
        let timeout = timeout_ms.unwrap_or(self.config.frame_sync_timeout_ms);
        match target {
            LoadTarget::Scope(FrameScope::Main) => {
                self.sync_one(FrameTarget::Main, condition, timeout, soft_errors)
                    .await;
            }
            LoadTarget::Scope(FrameScope::AllFrames) => {
                self.sync_one(FrameTarget::Main, condition, timeout, soft_errors)
                    .await;
                match self.driver.frame_count().await {
                    Ok(count) => {
                        for i in 0..count {
                            self.sync_one(FrameTarget::Child(i), condition, timeout, soft_errors)
                                .await;
                        }
                    }
                    Err(e) => {
                        record_soft(soft_errors, format!("frame enumeration failed: {:#}", e))
                    }
                }
            }
            LoadTarget::Child(i) => {
                self.sync_one(FrameTarget::Child(i), condition, timeout, soft_errors)
                    .await;
            }
        }
    }

    async fn sync_one(
        &self,
        target: FrameTarget,
        condition: LoadCondition,
        timeout_ms: u64,
        soft_errors: &mut Vec<String>,
    ) {
        match self.driver.wait_for_load(target, condition, timeout_ms).await {
            Ok(true) => {}
            Ok(false) => record_soft(
                soft_errors,
                format!(
                    "{} did not reach {} within {}ms",
                    target, condition, timeout_ms
                ),
            ),
            Err(e) => record_soft(soft_errors, format!("load wait on {} failed: {:#}", target, e)),
        }
    }
}

fn record_soft(soft_errors: &mut Vec<String>, message: String) {
    warn!("{}", message);
    soft_errors.push(message);
}
