use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::driver::traits::{BrowserDriver, FrameTarget};
use crate::parser::types::{LoadCondition, WaitUntil};

/// Scripted in-memory driver. Match counts, visibility delays and failures
/// are configured up front; every dispatched interaction is logged so tests
/// can assert on ordering.
#[derive(Default)]
pub struct MockDriver {
    matches: Mutex<HashMap<String, usize>>,
    visible_after: Mutex<HashMap<String, usize>>,
    actions: Mutex<Vec<String>>,
    last_url: Mutex<String>,
    close_calls: AtomicUsize,
    frames: usize,
    load_ready: bool,
    fail_goto: bool,
    fail_close: bool,
    fail_clicks: AtomicUsize,
    fault: AtomicBool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            load_ready: true,
            ..Self::default()
        }
    }

    /// Script `count` matches for `query`
    pub fn with_match(self, query: &str, count: usize) -> Self {
        self.matches.lock().unwrap().insert(query.to_string(), count);
        self
    }

    /// Element matches but only reports visible after `polls` visibility checks
    pub fn visible_after(self, query: &str, polls: usize) -> Self {
        self.visible_after
            .lock()
            .unwrap()
            .insert(query.to_string(), polls);
        self
    }

    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// All load waits report timeout
    pub fn with_load_never_ready(mut self) -> Self {
        self.load_ready = false;
        self
    }

    pub fn with_failing_goto(mut self) -> Self {
        self.fail_goto = true;
        self
    }

    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// First `n` click dispatches fail with a backend error
    pub fn with_failing_clicks(self, n: usize) -> Self {
        self.fail_clicks.store(n, Ordering::SeqCst);
        self
    }

    /// Every element operation fails as if the session died
    pub fn with_fault(self) -> Self {
        self.fault.store(true, Ordering::SeqCst);
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn check_fault(&self) -> Result<()> {
        if self.fault.load(Ordering::SeqCst) {
            bail!("session is gone");
        }
        Ok(())
    }

    fn log(&self, entry: String) {
        self.actions.lock().unwrap().push(entry);
    }

    fn match_count(&self, query: &str) -> usize {
        self.matches.lock().unwrap().get(query).copied().unwrap_or(0)
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn goto(&self, url: &str, _wait_until: WaitUntil, _timeout_ms: u64) -> Result<()> {
        if self.fail_goto {
            bail!("net::ERR_CONNECTION_REFUSED at {}", url);
        }
        *self.last_url.lock().unwrap() = url.to_string();
        self.log(format!("goto {}", url));
        Ok(())
    }

    async fn sync_active_page(&self) -> Result<()> {
        Ok(())
    }

    async fn active_url(&self) -> Result<String> {
        Ok(self.last_url.lock().unwrap().clone())
    }

    async fn frame_count(&self) -> Result<usize> {
        Ok(self.frames)
    }

    async fn wait_for_load(
        &self,
        target: FrameTarget,
        condition: LoadCondition,
        _timeout_ms: u64,
    ) -> Result<bool> {
        self.log(format!("waitForLoad {} {}", target, condition));
        Ok(self.load_ready)
    }

    async fn count_matches(&self, _target: FrameTarget, query: &str) -> Result<usize> {
        self.check_fault()?;
        Ok(self.match_count(query))
    }

    async fn is_visible(
        &self,
        _target: FrameTarget,
        query: &str,
        index: usize,
    ) -> Result<Option<bool>> {
        self.check_fault()?;
        if index >= self.match_count(query) {
            return Ok(None);
        }
        let mut delays = self.visible_after.lock().unwrap();
        match delays.get_mut(query) {
            Some(0) | None => Ok(Some(true)),
            Some(polls) => {
                *polls -= 1;
                Ok(Some(false))
            }
        }
    }

    async fn click(&self, _target: FrameTarget, query: &str, index: usize) -> Result<bool> {
        self.check_fault()?;
        if index >= self.match_count(query) {
            return Ok(false);
        }
        let remaining = self.fail_clicks.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_clicks.store(remaining - 1, Ordering::SeqCst);
            bail!("element is detached from the DOM");
        }
        self.log(format!("click {}[{}]", query, index));
        Ok(true)
    }

    async fn fill(
        &self,
        _target: FrameTarget,
        query: &str,
        index: usize,
        value: &str,
    ) -> Result<bool> {
        self.check_fault()?;
        if index >= self.match_count(query) {
            return Ok(false);
        }
        self.log(format!("fill {}[{}]={}", query, index, value));
        Ok(true)
    }

    async fn scroll_into_view(
        &self,
        _target: FrameTarget,
        query: &str,
        index: usize,
    ) -> Result<bool> {
        self.check_fault()?;
        if index >= self.match_count(query) {
            return Ok(false);
        }
        self.log(format!("scroll {}[{}]", query, index));
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            bail!("browser already closed");
        }
        Ok(())
    }
}
