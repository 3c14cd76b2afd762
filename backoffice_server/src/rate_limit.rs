//! Per-client request limits for the `/api` routes.
//!
//! Limits are advisory and process-local: they are kept in memory and reset when the server restarts.
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use log::*;

use crate::config::RateLimitConfig;

pub trait RateLimiter: Send + Sync {
    /// Counts a request against `key` and returns whether it may go ahead.
    fn allow(&self, key: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

#[derive(Debug)]
struct LimiterState {
    windows: HashMap<String, Window>,
    next_purge: Instant,
}

/// Allows up to `max_requests` per key in fixed windows of `window` length. A key's window starts with its first
/// request. Expired windows are purged once per window length.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<LimiterState>,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let state = LimiterState { windows: HashMap::new(), next_purge: Instant::now() + window };
        Self { max_requests, window, state: Mutex::new(state) }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window)
    }

    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut state = self.lock();
        if now >= state.next_purge {
            let before = state.windows.len();
            state.windows.retain(|_, w| now < w.resets_at);
            state.next_purge = now + self.window;
            trace!("💻️ Purged {} expired rate limit windows", before - state.windows.len());
        }
        match state.windows.get_mut(key) {
            Some(w) if now < w.resets_at => {
                if w.count >= self.max_requests {
                    return false;
                }
                w.count += 1;
                true
            },
            _ => {
                state.windows.insert(key.to_string(), Window { count: 1, resets_at: now + self.window });
                self.max_requests > 0
            },
        }
    }

    /// The number of clients currently being tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock().windows.len()
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        // The state is a plain counter map and stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }
}
