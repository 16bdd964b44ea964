//! Open-connection counter per source address.
//!
//! Diagnostic only; no admission decision reads it.

use log::error;
use std::collections::HashMap;
use std::net::IpAddr;

#[derive(Debug, Default)]
pub struct ConnectionCounter {
    counts: HashMap<IpAddr, usize>,
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the count for `ip` after incrementing.
    pub fn increment(&mut self, ip: IpAddr) -> usize {
        let count = self.counts.entry(ip).or_insert(0);
        *count += 1;
        *count
    }

    /// Returns the count for `ip` after decrementing. Sources reaching zero
    /// are removed; the count never goes negative.
    pub fn decrement(&mut self, ip: IpAddr) -> usize {
        let Some(count) = self.counts.get_mut(&ip) else {
            error!("Connection count underflow for {}", ip);
            return 0;
        };

        *count = count.saturating_sub(1);
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(&ip);
        }
        remaining
    }

    pub fn count_for(&self, ip: IpAddr) -> usize {
        self.counts.get(&ip).copied().unwrap_or(0)
    }

    /// Sum of open connections over all sources.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn increment_and_decrement_balance() {
        let ip = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let mut counter = ConnectionCounter::new();
        assert_eq!(counter.increment(ip), 1);
        assert_eq!(counter.increment(ip), 2);
        assert_eq!(counter.total(), 2);
        assert_eq!(counter.decrement(ip), 1);
        assert_eq!(counter.decrement(ip), 0);
        assert_eq!(counter.count_for(ip), 0);
        assert_eq!(counter.total(), 0);
    }

    #[test]
    fn decrement_never_goes_negative() {
        let ip = IpAddr::V6(Ipv6Addr::LOCALHOST);
        let mut counter = ConnectionCounter::new();
        assert_eq!(counter.decrement(ip), 0);
        assert_eq!(counter.count_for(ip), 0);
    }
}
