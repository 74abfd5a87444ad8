use anyhow::Result;
use async_trait::async_trait;

use crate::parser::types::{LoadCondition, WaitUntil};

/// Frame addressing. Child frames are indexed in document order of their
/// iframe elements on the active page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTarget {
    Main,
    Child(usize),
}

impl std::fmt::Display for FrameTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameTarget::Main => write!(f, "main frame"),
            FrameTarget::Child(i) => write!(f, "frame {}", i),
        }
    }
}

/// Capability surface required from a browser automation backend.
///
/// The engine never talks to an automation library directly; anything
/// implementing this trait is substitutable. Queries are pre-compiled
/// selector strings; the index-th match is picked in document order.
/// Methods return Ok(false) (or Ok(None)) for a clean no-match, and Err
/// only for backend failures.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Load `url` in the active page, waiting only as far as `wait_until`
    async fn goto(&self, url: &str, wait_until: WaitUntil, timeout_ms: u64) -> Result<()>;

    /// Point the active-page reference at the most recently opened page
    async fn sync_active_page(&self) -> Result<()>;

    /// URL of the active page
    async fn active_url(&self) -> Result<String>;

    /// Number of child frames on the active page
    async fn frame_count(&self) -> Result<usize>;

    /// Wait until `target` reaches `condition`. Ok(false) on timeout.
    async fn wait_for_load(
        &self,
        target: FrameTarget,
        condition: LoadCondition,
        timeout_ms: u64,
    ) -> Result<bool>;

    /// Number of elements matching `query` in `target`
    async fn count_matches(&self, target: FrameTarget, query: &str) -> Result<usize>;

    /// Visibility of the index-th match. Ok(None) when nothing matches.
    async fn is_visible(
        &self,
        target: FrameTarget,
        query: &str,
        index: usize,
    ) -> Result<Option<bool>>;

    /// Click the index-th match. Ok(false) when nothing matches.
    async fn click(&self, target: FrameTarget, query: &str, index: usize) -> Result<bool>;

    /// Fill the index-th match with `value`. Ok(false) when nothing matches.
    async fn fill(
        &self,
        target: FrameTarget,
        query: &str,
        index: usize,
        value: &str,
    ) -> Result<bool>;

    /// Scroll the index-th match into view. Ok(false) when nothing matches.
    async fn scroll_into_view(&self, target: FrameTarget, query: &str, index: usize)
        -> Result<bool>;

    /// Tear down pages, context and browser, in that order
    async fn close(&self) -> Result<()>;
}
