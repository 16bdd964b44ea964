//! Ban registry
//!
//! Temporary bans keyed by source address. An entry only bans while its
//! expiry lies in the future; expired entries are inert until overwritten
//! or pruned.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

pub struct BanRegistry {
    bans: HashMap<IpAddr, Instant>,
    duration: Duration,
}

impl BanRegistry {
    pub fn new(duration: Duration) -> Self {
        Self {
            bans: HashMap::new(),
            duration,
        }
    }

    /// True iff `ip` has an entry and `now` is strictly before its expiry.
    pub fn is_banned(&self, ip: IpAddr, now: Instant) -> bool {
        self.bans.get(&ip).is_some_and(|&until| now < until)
    }

    /// Bans `ip` until `now + duration`, replacing any previous entry.
    /// Returns the new expiry.
    pub fn ban(&mut self, ip: IpAddr, now: Instant) -> Instant {
        let until = now + self.duration;
        self.bans.insert(ip, until);
        until
    }

    pub fn expiry(&self, ip: IpAddr) -> Option<Instant> {
        self.bans.get(&ip).copied()
    }

    /// Sources still banned at `now` with their remaining ban time.
    pub fn active_bans(&self, now: Instant) -> Vec<(IpAddr, Duration)> {
        self.bans
            .iter()
            .filter(|&(_, &until)| now < until)
            .map(|(&ip, &until)| (ip, until - now))
            .collect()
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.bans.len();
        self.bans.retain(|_, until| now < *until);
        before - self.bans.len()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
