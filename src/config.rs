use serde::{Deserialize, Serialize};

/// Runner configuration with environment overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunnerConfig {
    /// Base URL joined with relative scenario URLs
    pub base_url: Option<String>,

    /// Default timeout for element actions and assertions
    pub default_timeout_ms: u64,

    /// Timeout for the navigation commit itself
    pub navigation_timeout_ms: u64,

    /// Best-effort frame synchronization timeout after navigation
    pub frame_sync_timeout_ms: u64,

    /// Delay inserted before each element action. 0 disables.
    pub settle_delay_ms: u64,

    /// Starting poll interval for retried operations
    pub poll_initial_interval_ms: u64,

    /// Poll interval cap after backoff
    pub poll_max_interval_ms: u64,

    pub headless: bool,

    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_timeout_ms: 5000,
            navigation_timeout_ms: 10000,
            frame_sync_timeout_ms: 3000,
            settle_delay_ms: 500,
            poll_initial_interval_ms: 100,
            poll_max_interval_ms: 500,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl RunnerConfig {
    /// Apply FARO_HEADLESS and FARO_BASE_URL overrides
    pub fn apply_env(mut self) -> Self {
        if let Ok(v) = std::env::var("FARO_HEADLESS") {
            self.headless = v != "false" && v != "0";
        }
        if let Ok(v) = std::env::var("FARO_BASE_URL") {
            if !v.is_empty() {
                self.base_url = Some(v);
            }
        }
        self
    }

    /// Join a scenario URL against the base URL. Absolute URLs pass through.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("about:") {
            return url.to_string();
        }
        match &self.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            None => url.to_string(),
        }
    }
}
