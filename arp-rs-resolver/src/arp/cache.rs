use crate::clock::Clock;
use crate::timer::Timer;
use arp_rs_packets::MacAddr;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A learned IPv4-to-MAC binding and when it was last confirmed.
struct CacheEntry {
    mac: MacAddr,
    timestamp: Instant,
}

impl CacheEntry {
    fn new(mac: MacAddr, now: Instant) -> CacheEntry {
        CacheEntry {
            mac,
            timestamp: now,
        }
    }

    fn update(&mut self, now: Instant) {
        self.timestamp = now;
    }

    fn expired(&self, now: Instant, max_age: Duration) -> bool {
        now.saturating_duration_since(self.timestamp) >= max_age
    }
}

/// Learned neighbor bindings with a single uniform expiry policy.
///
/// The sweeper timer lives inside the container so that it runs exactly
/// while there are entries to expire: `learn` arms it on the first insert,
/// `flush_expired` re-arms it only while entries remain.
pub(crate) struct Cache {
    entries: HashMap<Ipv4Addr, CacheEntry>,
    sweeper: Timer,
    flush_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl Cache {
    pub fn new(clock: Arc<dyn Clock>, flush_interval: Duration) -> Cache {
        Cache {
            entries: HashMap::new(),
            sweeper: Timer::new(clock.clone()),
            flush_interval,
            clock,
        }
    }

    /// Records that `ip` was heard speaking as `mac`. A matching binding has
    /// its timestamp refreshed; a conflicting one is replaced wholesale,
    /// trusting the latest speaker. The broadcast address is never stored.
    pub fn learn(&mut self, ip: Ipv4Addr, mac: MacAddr) {
        if ip.is_broadcast() {
            return;
        }

        let now = self.clock.now();
        if let Some(entry) = self.entries.get_mut(&ip) {
            if entry.mac != mac {
                trace!("{} moved from {} to {}", ip, entry.mac, mac);
                *entry = CacheEntry::new(mac, now);
            } else {
                entry.update(now);
            }
        } else {
            debug!("caching {} for {}", ip, mac);
            self.entries.insert(ip, CacheEntry::new(mac, now));
            if !self.sweeper.is_running() {
                self.sweeper.start(self.flush_interval);
            }
        }
    }

    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries.get(&ip).map(|entry| entry.mac)
    }

    /// Sweeper callback: drops entries past the flush interval and re-arms
    /// only while the cache stays populated.
    pub fn flush_expired(&mut self) {
        let now = self.clock.now();
        let max_age = self.flush_interval;
        self.entries.retain(|ip, entry| {
            let keep = !entry.expired(now, max_age);
            if !keep {
                debug!("expiring cache entry for {}", ip);
            }
            keep
        });

        if !self.is_empty() {
            self.sweeper.start(self.flush_interval);
        }
    }

    /// Drops every entry and cancels the sweeper.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sweeper.stop();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn sweep_due(&mut self) -> bool {
        self.sweeper.take_due()
    }

    pub fn sweep_at(&self) -> Option<Instant> {
        self.sweeper.deadline()
    }
}
