use crate::timer::Timer;
use arp_rs_packets::EthernetFrame;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

struct PendingEntry {
    chain: Vec<EthernetFrame>,
    attempts: u32,
}

/// Outbound packets parked per next-hop until resolution arrives.
///
/// Chains keep arrival order; a chain leaves the queue whole, either when
/// any ARP frame from its next-hop arrives (drained to the link) or when
/// the host's retry cap evicts it. The retry timer lives inside the
/// container and flips only on emptiness transitions: armed by the enqueue
/// that populates the queue, stopped by the drain or eviction that empties
/// it.
pub(crate) struct PendingQueue {
    waiting: HashMap<Ipv4Addr, PendingEntry>,
    retry: Timer,
    retry_interval: Duration,
}

impl PendingQueue {
    pub fn new(retry: Timer, retry_interval: Duration) -> PendingQueue {
        PendingQueue {
            waiting: HashMap::new(),
            retry,
            retry_interval,
        }
    }

    /// Parks a packet behind `next_hop`. Returns true if this created the
    /// entry, in which case the caller owes the first resolution attempt.
    pub fn enqueue(&mut self, next_hop: Ipv4Addr, frame: EthernetFrame) -> bool {
        match self.waiting.entry(next_hop) {
            Entry::Occupied(mut entry) => {
                trace!("packets already queueing for {}", next_hop);
                entry.get_mut().chain.push(frame);
                false
            }
            Entry::Vacant(slot) => {
                debug!("first packet waiting on {}", next_hop);
                slot.insert(PendingEntry {
                    chain: vec![frame],
                    attempts: 0,
                });
                if !self.retry.is_running() {
                    self.retry.start(self.retry_interval);
                }
                true
            }
        }
    }

    /// Removes and returns the chain parked behind `ip`, in enqueue order.
    pub fn drain(&mut self, ip: Ipv4Addr) -> Option<Vec<EthernetFrame>> {
        let entry = self.waiting.remove(&ip)?;
        if self.waiting.is_empty() {
            self.retry.stop();
        }
        Some(entry.chain)
    }

    /// One retry sweep's worth of bookkeeping: bumps every entry's attempt
    /// count, evicts entries past the host's cap, and returns the addresses
    /// that still need a request sent.
    pub fn sweep_targets(&mut self, max_retries: Option<u32>) -> Vec<Ipv4Addr> {
        if let Some(cap) = max_retries {
            self.waiting.retain(|ip, entry| {
                let keep = entry.attempts < cap;
                if !keep {
                    debug!("giving up on {} after {} retries", ip, entry.attempts);
                }
                keep
            });
        }

        self.waiting
            .iter_mut()
            .map(|(ip, entry)| {
                entry.attempts += 1;
                *ip
            })
            .collect()
    }

    /// Drops every chain and cancels the retry timer.
    pub fn clear(&mut self) {
        self.waiting.clear();
        self.retry.stop();
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.waiting.contains_key(&ip)
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn retry_due(&mut self) -> bool {
        self.retry.take_due()
    }

    pub fn retry_at(&self) -> Option<Instant> {
        self.retry.deadline()
    }

    pub fn rearm_retry(&mut self) {
        self.retry.start(self.retry_interval);
    }

    pub fn stop_retry(&mut self) {
        self.retry.stop();
    }
}
