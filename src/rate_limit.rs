//! Request rate limiting for the public notification endpoint.
//!
//! The limiter is injectable so a multi-instance deployment can back it
//! with a shared store; the fixed-window implementation here is
//! process-local and intended for single-instance use.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited;

pub trait RateLimiter: Send + Sync {
    /// Ok to proceed, or RateLimited when the window is exhausted.
    fn try_acquire(&self) -> Result<(), RateLimited>;
}

struct Window {
    started: Instant,
    count: u32,
}

/// Counts requests in a rolling window; the counter resets once the
/// window has fully elapsed.
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Per-minute convenience used by the dispatcher.
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    fn try_acquire_at(&self, now: Instant) -> Result<(), RateLimited> {
        let mut window = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if now.duration_since(window.started) > self.window {
            window.started = now;
            window.count = 1;
            return Ok(());
        }

        if window.count >= self.max_requests {
            return Err(RateLimited);
        }

        window.count += 1;
        Ok(())
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn try_acquire(&self) -> Result<(), RateLimited> {
        self.try_acquire_at(Instant::now())
    }
}
