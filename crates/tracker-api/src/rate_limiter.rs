//! Request pacing for the remote service.
//!
//! Enforces a minimum spacing between requests plus a rolling per-minute cap,
//! so a burst of UI actions cannot hammer the service.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with per-second spacing and a per-minute window
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum interval between consecutive requests
    min_interval: Duration,
    /// Maximum requests inside the rolling window
    max_per_minute: usize,
    /// Timestamp of the most recent request
    last_request: Option<Instant>,
    /// Request timestamps inside the rolling window, oldest first
    window: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        Self {
            min_interval: Duration::from_secs_f64(1.0 / max_per_second),
            max_per_minute: max_per_minute as usize,
            last_request: None,
            window: VecDeque::with_capacity(max_per_minute as usize),
        }
    }

    /// Wait until a request may be made, then record it
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        self.prune(now);

        let mut ready = now;
        if let Some(last) = self.last_request {
            ready = ready.max(last + self.min_interval);
        }
        if self.window.len() >= self.max_per_minute {
            if let Some(&oldest) = self.window.front() {
                ready = ready.max(oldest + WINDOW);
            }
        }

        if ready > now {
            tracing::debug!(
                wait_ms = (ready - now).as_millis(),
                "Rate limit: delaying request"
            );
            sleep_until(ready).await;
        }

        let stamp = Instant::now();
        self.prune(stamp);
        self.last_request = Some(stamp);
        self.window.push_back(stamp);
    }

    /// Requests recorded inside the current window
    pub fn current_minute_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.window.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&front) = self.window.front() {
            if now.duration_since(front) >= WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_per_second_spacing() {
        let mut limiter = RateLimiter::new(2.0, 50);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }

        // Two gaps of 500ms each
        assert!(start.elapsed() >= Duration::from_millis(990));
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_minute_window() {
        let mut limiter = RateLimiter::new(1000.0, 3);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));

        // Fourth request must wait for the window to roll
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_secs(59));
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_minute_count() {
        let mut limiter = RateLimiter::new(1000.0, 50);
        assert_eq!(limiter.current_minute_count(), 0);

        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(limiter.current_minute_count(), 2);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(limiter.current_minute_count(), 0);
    }
}
