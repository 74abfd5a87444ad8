use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use playwright::api::{Browser, BrowserContext, DocumentLoadState, ElementHandle, Frame, Page, Viewport};
use playwright::Playwright;
use tokio::sync::Mutex;

use crate::config::RunnerConfig;
use crate::driver::common::{self, PollConfig};
use crate::driver::traits::{BrowserDriver, FrameTarget};
use crate::parser::types::{LoadCondition, WaitUntil};

/// Hardened launch arguments for CI containers and local runs alike
const CHROMIUM_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--ignore-certificate-errors",
];

/// Browser driver backed by Playwright chromium.
///
/// One launched browser, one isolated context, one active page. The active
/// page can be re-pointed after a step opens a new tab or window.
pub struct PlaywrightDriver {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    poll: PollConfig,
}

impl PlaywrightDriver {
    /// Launch chromium and open a fresh context and page
    pub async fn launch(config: &RunnerConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;
        playwright
            .prepare()
            .context("Failed to prepare browser binaries")?;

        let chromium = playwright.chromium();
        let mut launcher = chromium.launcher().headless(config.headless);

        let env_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
            .ok()
            .map(std::path::PathBuf::from);
        if let Some(ref path) = env_path {
            debug!("using browser executable from env: {}", path.display());
            launcher = launcher.executable(path);
        }

        let args: Vec<String> = CHROMIUM_ARGS.iter().map(|s| s.to_string()).collect();
        launcher = launcher.args(&args);

        let browser = launcher.launch().await.context("Failed to launch chromium")?;
        let context = browser
            .context_builder()
            .build()
            .await
            .context("Failed to create browser context")?;
        let page = context.new_page().await.context("Failed to open page")?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        debug!(
            "chromium ready (headless: {}, viewport: {}x{})",
            config.headless, config.viewport_width, config.viewport_height
        );

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            poll: PollConfig {
                timeout_ms: 0,
                initial_interval_ms: config.poll_initial_interval_ms,
                max_interval_ms: config.poll_max_interval_ms,
                use_exponential_backoff: true,
            },
        })
    }

    /// Child frame by document-order index of its iframe element
    async fn child_frame(page: &Page, index: usize) -> Result<Option<Frame>> {
        let iframes = page.query_selector_all("iframe").await?;
        match iframes.into_iter().nth(index) {
            Some(el) => Ok(el.content_frame().await?),
            None => Ok(None),
        }
    }

    /// The index-th element matching `query` in `target`, in document order
    async fn nth_match(
        page: &Page,
        target: FrameTarget,
        query: &str,
        index: usize,
    ) -> Result<Option<ElementHandle>> {
        let matches = match target {
            FrameTarget::Main => page.query_selector_all(query).await?,
            FrameTarget::Child(i) => match Self::child_frame(page, i).await? {
                Some(frame) => frame.query_selector_all(query).await?,
                None => return Ok(None),
            },
        };
        Ok(matches.into_iter().nth(index))
    }

    /// document.readyState of `target`. Empty string when the frame is gone.
    async fn ready_state(page: &Page, target: FrameTarget) -> Result<String> {
        const JS: &str = "() => document.readyState";
        match target {
            FrameTarget::Main => Ok(page.eval::<String>(JS).await?),
            FrameTarget::Child(i) => match Self::child_frame(page, i).await? {
                Some(frame) => Ok(frame.eval::<String>(JS).await?),
                None => Ok(String::new()),
            },
        }
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    fn name(&self) -> &str {
        "playwright"
    }

    async fn goto(&self, url: &str, wait_until: WaitUntil, timeout_ms: u64) -> Result<()> {
        let page = self.page.lock().await;
        // The crate exposes no commit-only wait; DomContentLoaded is the
        // earliest load state it reports.
        let state = match wait_until {
            WaitUntil::Commit | WaitUntil::DomContentLoaded => DocumentLoadState::DomContentLoaded,
            WaitUntil::Load => DocumentLoadState::Load,
        };
        page.goto_builder(url)
            .wait_until(state)
            .timeout(timeout_ms as f64)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn sync_active_page(&self) -> Result<()> {
        let pages = self.context.pages()?;
        if let Some(latest) = pages.into_iter().last() {
            latest.bring_to_front().await.ok();
            let mut page = self.page.lock().await;
            *page = latest;
        }
        Ok(())
    }

    async fn active_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        Ok(page.url()?)
    }

    async fn frame_count(&self) -> Result<usize> {
        let page = self.page.lock().await;
        Ok(page.query_selector_all("iframe").await?.len())
    }

    async fn wait_for_load(
        &self,
        target: FrameTarget,
        condition: LoadCondition,
        timeout_ms: u64,
    ) -> Result<bool> {
        let page = self.page.lock().await;
        let wanted: &'static [&'static str] = match condition {
            LoadCondition::DomContentLoaded => &["interactive", "complete"],
            LoadCondition::Load => &["complete"],
        };

        let page_ref = &*page;
        let reached = common::wait_until(
            || async move {
                match Self::ready_state(page_ref, target).await {
                    Ok(state) => wanted.contains(&state.as_str()),
                    Err(_) => false,
                }
            },
            PollConfig {
                timeout_ms,
                ..self.poll.clone()
            },
        )
        .await;
        Ok(reached)
    }

    async fn count_matches(&self, target: FrameTarget, query: &str) -> Result<usize> {
        let page = self.page.lock().await;
        match target {
            FrameTarget::Main => Ok(page.query_selector_all(query).await?.len()),
            FrameTarget::Child(i) => match Self::child_frame(&page, i).await? {
                Some(frame) => Ok(frame.query_selector_all(query).await?.len()),
                None => Ok(0),
            },
        }
    }

    async fn is_visible(
        &self,
        target: FrameTarget,
        query: &str,
        index: usize,
    ) -> Result<Option<bool>> {
        let page = self.page.lock().await;
        match Self::nth_match(&page, target, query, index).await? {
            Some(el) => Ok(Some(el.is_visible().await?)),
            None => Ok(None),
        }
    }

    async fn click(&self, target: FrameTarget, query: &str, index: usize) -> Result<bool> {
        let page = self.page.lock().await;
        match Self::nth_match(&page, target, query, index).await? {
            Some(el) => {
                el.click_builder().click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fill(
        &self,
        target: FrameTarget,
        query: &str,
        index: usize,
        value: &str,
    ) -> Result<bool> {
        let page = self.page.lock().await;
        match Self::nth_match(&page, target, query, index).await? {
            Some(el) => {
                el.fill_builder(value).fill().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn scroll_into_view(
        &self,
        target: FrameTarget,
        query: &str,
        index: usize,
    ) -> Result<bool> {
        let page = self.page.lock().await;
        match Self::nth_match(&page, target, query, index).await? {
            Some(el) => {
                el.scroll_into_view_if_needed(None).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(&self) -> Result<()> {
        self.context
            .close()
            .await
            .context("Failed to close browser context")?;
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        Ok(())
    }
}
