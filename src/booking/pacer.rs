//! Blocking outbound rate limiter for the booking API.
//!
//! Two rules are enforced before every call:
//! - a minimum spacing between consecutive calls;
//! - optionally, at most `max` calls per rolling window. Once the cap is
//!   reached the caller sleeps out the rest of the window.
//!
//! Clones share state. A pacer built per request limits that request only;
//! one pacer cloned into every request limits the whole process.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::BookingApiSettings;

#[derive(Debug, Default)]
struct PacerState {
    last_call: Option<Instant>,
    window_start: Option<Instant>,
    window_count: u32,
    total_calls: u32,
}

#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    window: Option<(u32, Duration)>,
    state: Arc<Mutex<PacerState>>,
}

impl Pacer {
    /// Pacer enforcing only a minimum spacing between calls.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            window: None,
            state: Arc::new(Mutex::new(PacerState::default())),
        }
    }

    /// Add a rolling cap of `max` calls per `window`.
    pub fn with_window(mut self, max: u32, window: Duration) -> Self {
        self.window = Some((max.max(1), window));
        self
    }

    /// Spacing-only pacer for single-day scans.
    pub fn for_day_scan(settings: &BookingApiSettings) -> Self {
        Self::new(settings.min_interval())
    }

    /// Spacing plus rolling window for range scans.
    pub fn for_range_scan(settings: &BookingApiSettings) -> Self {
        Self::new(settings.min_interval())
            .with_window(settings.window_max_requests, settings.window())
    }

    /// Block until the next call may go out and record it.
    ///
    /// Returns how long the caller slept. The lock is held while sleeping so
    /// callers sharing a pacer queue up behind each other.
    pub fn wait(&self) -> Duration {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slept = Duration::ZERO;

        if let Some((max, window)) = self.window {
            if let Some(start) = state.window_start {
                let elapsed = start.elapsed();
                if elapsed >= window {
                    state.window_start = None;
                    state.window_count = 0;
                } else if state.window_count >= max {
                    let rest = window - elapsed;
                    debug!(
                        calls = state.window_count,
                        wait_ms = rest.as_millis() as u64,
                        "request window exhausted, sleeping"
                    );
                    thread::sleep(rest);
                    slept += rest;
                    state.window_start = None;
                    state.window_count = 0;
                }
            }
        }

        if let Some(last) = state.last_call {
            let since = last.elapsed();
            if since < self.min_interval {
                let rest = self.min_interval - since;
                thread::sleep(rest);
                slept += rest;
            }
        }

        let now = Instant::now();
        state.last_call = Some(now);
        if state.window_start.is_none() {
            state.window_start = Some(now);
        }
        state.window_count += 1;
        state.total_calls += 1;
        slept
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_does_not_wait() {
        let pacer = Pacer::new(Duration::from_secs(5));
        assert_eq!(pacer.wait(), Duration::ZERO);
        assert_eq!(pacer.calls(), 1);
    }

    #[test]
    fn n_calls_take_at_least_n_minus_one_intervals() {
        let interval = Duration::from_millis(30);
        let pacer = Pacer::new(interval);
        let started = Instant::now();
        for _ in 0..5 {
            pacer.wait();
        }
        assert!(started.elapsed() >= interval * 4);
        assert_eq!(pacer.calls(), 5);
    }

    #[test]
    fn window_cap_sleeps_out_the_window() {
        let window = Duration::from_millis(120);
        let pacer = Pacer::new(Duration::ZERO).with_window(2, window);
        let started = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(started.elapsed() < window);
        pacer.wait();
        assert!(started.elapsed() >= window);
    }

    #[test]
    fn clones_share_spacing() {
        let interval = Duration::from_millis(40);
        let a = Pacer::new(interval);
        let b = a.clone();
        let started = Instant::now();
        a.wait();
        b.wait();
        assert!(started.elapsed() >= interval);
        assert_eq!(a.calls(), 2);
    }

    #[test]
    fn separate_pacers_do_not_interact() {
        let a = Pacer::new(Duration::from_secs(5));
        let b = Pacer::new(Duration::from_secs(5));
        a.wait();
        assert_eq!(b.wait(), Duration::ZERO);
    }
}
