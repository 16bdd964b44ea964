//! Rate limiting middleware
//!
//! Sliding request window per source address.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Sliding window of recent request instants, oldest first, per source.
pub struct RateWindowTracker {
    requests: HashMap<IpAddr, VecDeque<Instant>>,
    window: Duration,
}

impl RateWindowTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            window,
        }
    }

    /// Records a request at `now` and returns how many requests from `ip`
    /// fall inside the window, the new one included.
    ///
    /// Entries strictly older than `now - window` are evicted in the same
    /// step, so the count never includes stale requests.
    pub fn record_and_count(&mut self, ip: IpAddr, now: Instant) -> usize {
        let entry = self.requests.entry(ip).or_default();
        entry.push_back(now);
        evict_stale(entry, now, self.window);
        entry.len()
    }

    /// Number of retained requests for `ip` without recording a new one.
    pub fn tracked(&self, ip: IpAddr) -> usize {
        self.requests.get(&ip).map_or(0, VecDeque::len)
    }

    /// Drops windows whose requests have all aged out. Returns how many
    /// sources were forgotten.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.requests.len();
        let window = self.window;
        self.requests.retain(|_, entry| {
            evict_stale(entry, now, window);
            !entry.is_empty()
        });
        before - self.requests.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

fn evict_stale(entry: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = entry.front() {
        if now.saturating_duration_since(oldest) > window {
            entry.pop_front();
        } else {
            break;
        }
    }
}
