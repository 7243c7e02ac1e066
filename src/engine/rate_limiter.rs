//! Multi-window rate limiter shared by all fetch workers.
//!
//! Every window keeps a log of the instants it granted. A call is granted only when every
//! window still has room, and then it is recorded in all of them under one lock.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::utils::config::RateLimits;

/// At most `max` grants within any rolling `window`.
#[derive(Clone, Copy, Debug)]
pub struct WindowLimit {
    pub window: Duration,
    pub max: usize,
}

impl WindowLimit {
    pub const fn new(window: Duration, max: usize) -> Self {
        Self { window, max }
    }
}

#[derive(Debug)]
struct Window {
    limit: WindowLimit,
    granted: VecDeque<Instant>,
}

impl Window {
    fn prune(&mut self, now: Instant) {
        while let Some(&t) = self.granted.front() {
            if now.saturating_duration_since(t) >= self.limit.window {
                self.granted.pop_front();
            } else {
                break;
            }
        }
    }

    fn has_room(&self) -> bool {
        self.granted.len() < self.limit.max
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<Vec<Window>>,
}

impl RateLimiter {
    pub fn new(limits: &[WindowLimit]) -> Self {
        let windows = limits
            .iter()
            .map(|&limit| Window {
                limit,
                granted: VecDeque::with_capacity(limit.max),
            })
            .collect();
        Self {
            windows: Mutex::new(windows),
        }
    }

    /// Sustained and burst caps of the public info endpoint.
    pub fn upstream_default() -> Self {
        Self::new(&[
            WindowLimit::new(RateLimits::SUSTAINED_WINDOW, RateLimits::SUSTAINED_MAX),
            WindowLimit::new(RateLimits::BURST_WINDOW, RateLimits::BURST_MAX),
        ])
    }

    /// No windows: every call is granted.
    pub fn unlimited() -> Self {
        Self::new(&[])
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Window>> {
        match self.windows.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Non-blocking. True when the call is granted (and counted against every window).
    /// The clock is read under the lock, so recorded grants stay in order across threads.
    pub fn allow(&self) -> bool {
        let mut windows = self.lock();
        grant(&mut windows, Instant::now())
    }

    /// [`Self::allow`] at an explicit instant. Instants must be non-decreasing across calls.
    pub fn allow_at(&self, now: Instant) -> bool {
        grant(&mut self.lock(), now)
    }
}

fn grant(windows: &mut [Window], now: Instant) -> bool {
    for w in windows.iter_mut() {
        w.prune(now);
    }
    if !windows.iter().all(Window::has_room) {
        return false;
    }
    for w in windows.iter_mut() {
        w.granted.push_back(now);
    }
    true
}
