use crate::stack::ProxyArp;
use arp_rs_packets::MacAddr;
use std::time::Duration;

/// Tunables for one ARP module instance.
pub struct ArpConfig {
    /// Maximum age of a cache entry, and the sweeper cadence.
    pub flush_interval: Duration,
    /// How often outstanding resolutions are re-broadcast.
    pub retry_interval: Duration,
    /// Upper bound on retry sweeps per pending next-hop. `None` retries
    /// until the peer answers, which is what hosts built against the wire
    /// behavior expect; a bound makes the queue drop the entry (and its
    /// packets) after that many sweeps.
    pub max_retries: Option<u32>,
    /// When set, every non-broadcast transmit goes to this MAC and the
    /// cache and resolver stay quiescent (test/bridging mode).
    pub passthrough_mac: Option<MacAddr>,
    /// Route hint for answering on behalf of other hosts.
    pub proxy: Option<ProxyArp>,
}

impl Default for ArpConfig {
    fn default() -> ArpConfig {
        ArpConfig {
            flush_interval: Duration::from_secs(5 * 60),
            retry_interval: Duration::from_secs(1),
            max_retries: None,
            passthrough_mac: None,
            proxy: None,
        }
    }
}
