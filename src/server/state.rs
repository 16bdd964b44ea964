//! Shared guard state
//!
//! The rate windows, bans and connection counts are mutated by every
//! connection handler. They live behind a single mutex so that the ban
//! check, the window update and any resulting ban happen as one step.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::GuardLimits;
use crate::middleware::{BanRegistry, ConnectionCounter, RateWindowTracker};

/// Admission decision for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Source is clear; hand the request to the command processor.
    Allowed,
    /// Source was already banned. Nothing was recorded.
    Blocked,
    /// This request pushed the source over the threshold and it is now banned.
    Throttled { requests: usize, until: Instant },
}

/// A banned source as seen by status readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannedSource {
    pub ip: IpAddr,
    pub remaining: Duration,
}

impl BannedSource {
    /// Remaining ban time rounded up to whole seconds.
    pub fn remaining_secs(&self) -> u64 {
        let secs = self.remaining.as_secs();
        if self.remaining.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Point-in-time view for dashboards and monitors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub active_connections: usize,
    pub banned: Vec<BannedSource>,
}

/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_bans: usize,
    pub idle_windows: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.expired_bans == 0 && self.idle_windows == 0
    }
}

struct GuardTables {
    windows: RateWindowTracker,
    bans: BanRegistry,
    connections: ConnectionCounter,
}

/// Server context owning every piece of per-source mutable state.
pub struct GuardState {
    tables: Mutex<GuardTables>,
    threshold: usize,
    block_duration: Duration,
}

impl GuardState {
    pub fn new(limits: GuardLimits) -> Self {
        Self {
            tables: Mutex::new(GuardTables {
                windows: RateWindowTracker::new(limits.window),
                bans: BanRegistry::new(limits.block_duration),
                connections: ConnectionCounter::new(),
            }),
            threshold: limits.threshold,
            block_duration: limits.block_duration,
        }
    }

    // Every critical section leaves the maps consistent; poisoning is ignored.
    fn tables(&self) -> MutexGuard<'_, GuardTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ban check, then window update and threshold check, atomically.
    ///
    /// A banned source never reaches the rate window, so requests made
    /// during a ban neither count nor extend it.
    pub fn admit(&self, ip: IpAddr, now: Instant) -> Verdict {
        let mut tables = self.tables();

        if tables.bans.is_banned(ip, now) {
            return Verdict::Blocked;
        }

        let requests = tables.windows.record_and_count(ip, now);
        if requests > self.threshold {
            let until = tables.bans.ban(ip, now);
            return Verdict::Throttled { requests, until };
        }

        Verdict::Allowed
    }

    /// Counts an open connection from `ip` until the returned guard drops.
    pub fn track_connection(self: &Arc<Self>, ip: IpAddr) -> ConnectionGuard {
        let open = self.tables().connections.increment(ip);
        ConnectionGuard {
            ip,
            open,
            state: Arc::clone(self),
        }
    }

    pub fn is_banned(&self, ip: IpAddr, now: Instant) -> bool {
        self.tables().bans.is_banned(ip, now)
    }

    /// Requests from `ip` currently inside the sliding window.
    pub fn tracked_requests(&self, ip: IpAddr) -> usize {
        self.tables().windows.tracked(ip)
    }

    pub fn active_connections(&self) -> usize {
        self.tables().connections.total()
    }

    pub fn connections_for(&self, ip: IpAddr) -> usize {
        self.tables().connections.count_for(ip)
    }

    /// Sources banned at `now`, ordered by address.
    pub fn banned_sources(&self, now: Instant) -> Vec<BannedSource> {
        let tables = self.tables();
        collect_banned(&tables.bans, now)
    }

    pub fn status(&self, now: Instant) -> StatusSnapshot {
        let tables = self.tables();
        StatusSnapshot {
            active_connections: tables.connections.total(),
            banned: collect_banned(&tables.bans, now),
        }
    }

    /// Forgets expired bans and windows with no live requests.
    pub fn sweep(&self, now: Instant) -> SweepReport {
        let mut tables = self.tables();
        SweepReport {
            expired_bans: tables.bans.prune(now),
            idle_windows: tables.windows.prune(now),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }
}

fn collect_banned(bans: &BanRegistry, now: Instant) -> Vec<BannedSource> {
    let mut banned: Vec<BannedSource> = bans
        .active_bans(now)
        .into_iter()
        .map(|(ip, remaining)| BannedSource { ip, remaining })
        .collect();
    banned.sort_by_key(|b| b.ip);
    banned
}

/// Decrements the source's connection count exactly once, on drop.
pub struct ConnectionGuard {
    ip: IpAddr,
    open: usize,
    state: Arc<GuardState>,
}

impl ConnectionGuard {
    /// Open connections from this source when the guard was taken.
    pub fn open_at_start(&self) -> usize {
        self.open
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.tables().connections.decrement(self.ip);
    }
}
