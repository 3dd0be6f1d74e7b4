//! Request and token budget for the LLM endpoint.
//!
//! Counters cover a rolling window that starts with the first request after
//! the previous window expired. Time comes from a [`Clock`] so the limiter
//! can be driven by hand in tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Usage within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub requests: u32,
    pub tokens: u32,
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    window: Duration,
    max_requests: u32,
    max_tokens: u32,
    window_start: Instant,
    usage: Usage,
}

impl RateLimiter {
    pub fn new(max_requests: u32, max_tokens: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            clock,
            window,
            max_requests: max_requests.max(1),
            max_tokens: max_tokens.max(1),
            window_start,
            usage: Usage { requests: 0, tokens: 0 },
        }
    }

    /// Per-minute limiter on the wall clock.
    pub fn per_minute(max_requests: u32, max_tokens: u32) -> Self {
        Self::new(
            max_requests,
            max_tokens,
            Duration::from_secs(60),
            Arc::new(SystemClock),
        )
    }

    /// Record one request of `tokens` estimated tokens, or return how long
    /// to wait before the window resets.
    ///
    /// A request larger than the whole token budget is admitted when it is
    /// the first in a fresh window, otherwise it could never run.
    pub fn try_acquire(&mut self, tokens: u32) -> Result<(), Duration> {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window {
            self.window_start = now;
            self.usage = Usage { requests: 0, tokens: 0 };
        }

        let over_requests = self.usage.requests >= self.max_requests;
        let over_tokens =
            self.usage.tokens > 0 && self.usage.tokens.saturating_add(tokens) > self.max_tokens;

        if over_requests || over_tokens {
            let resets_at = self.window_start + self.window;
            return Err(resets_at.saturating_duration_since(now));
        }

        self.usage.requests += 1;
        self.usage.tokens = self.usage.tokens.saturating_add(tokens);
        Ok(())
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }
}

/// Rough token estimate: four characters per token, rounded up.
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count();
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}
