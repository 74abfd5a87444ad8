use std::future::Future;
use std::time::{Duration, Instant};

/// Configuration for polling operations
#[derive(Clone)]
pub struct PollConfig {
    pub timeout_ms: u64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub use_exponential_backoff: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            initial_interval_ms: 100,
            max_interval_ms: 500,
            use_exponential_backoff: true,
        }
    }
}

/// Generic polling function with optional exponential backoff.
///
/// Calls `check_fn` repeatedly until it returns `true` or the timeout is
/// reached. At least one check runs even with a zero timeout. Returns
/// `true` if the condition was met, `false` if timed out.
pub async fn wait_until<F, Fut>(check_fn: F, config: PollConfig) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut interval = config.initial_interval_ms;

    loop {
        if check_fn().await {
            return true;
        }

        if start.elapsed() >= timeout {
            return false;
        }

        tokio::time::sleep(Duration::from_millis(interval)).await;

        if config.use_exponential_backoff {
            interval = (interval * 3 / 2).min(config.max_interval_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_wait_until_succeeds_after_retries() {
        let calls = AtomicUsize::new(0);
        let ok = wait_until(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                n >= 2
            },
            PollConfig {
                timeout_ms: 2000,
                initial_interval_ms: 10,
                max_interval_ms: 20,
                use_exponential_backoff: true,
            },
        )
        .await;
        assert!(ok);
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let start = Instant::now();
        let ok = wait_until(
            || async { false },
            PollConfig {
                timeout_ms: 50,
                initial_interval_ms: 10,
                max_interval_ms: 10,
                use_exponential_backoff: false,
            },
        )
        .await;
        assert!(!ok);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_wait_until_checks_at_least_once() {
        let calls = AtomicUsize::new(0);
        let ok = wait_until(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            },
            PollConfig {
                timeout_ms: 0,
                initial_interval_ms: 10,
                max_interval_ms: 10,
                use_exponential_backoff: false,
            },
        )
        .await;
        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
