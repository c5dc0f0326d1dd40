mod cache;
mod pending;

use self::cache::Cache;
use self::pending::PendingQueue;
use crate::clock::Clock;
use crate::config::ArpConfig;
use crate::stack::{LinkTx, ProxyArp, Stack};
use crate::stats::StatRegistry;
use crate::timer::Timer;
use arp_rs_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr, ARP_ETHER_TYPE, IPV4_ETHER_TYPE};
use std::convert::TryFrom;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// The ARP side of one attached interface.
///
/// Owns the learning cache and the pending-send queue, answers requests for
/// the local address (or proxied addresses), and drives resolution retries.
/// Everything runs to completion inside the host stack's event context:
/// inbound frames arrive through [`Arp::receive`], outbound IPv4 packets
/// through [`Arp::transmit`], and the two timers through
/// [`Arp::poll_at`] / [`Arp::poll`].
pub struct Arp {
    requests_rx: Arc<AtomicU32>,
    requests_tx: Arc<AtomicU32>,
    replies_rx: Arc<AtomicU32>,
    replies_tx: Arc<AtomicU32>,
    stack: Arc<dyn Stack>,
    link: Arc<dyn LinkTx>,
    mac: MacAddr,
    cache: Cache,
    waiting: PendingQueue,
    proxy: Option<ProxyArp>,
    passthrough_mac: Option<MacAddr>,
    max_retries: Option<u32>,
}

impl Arp {
    pub fn new(
        stack: Arc<dyn Stack>,
        link: Arc<dyn LinkTx>,
        stats: &StatRegistry,
        clock: Arc<dyn Clock>,
        config: ArpConfig,
    ) -> Arp {
        let ArpConfig {
            flush_interval,
            retry_interval,
            max_retries,
            passthrough_mac,
            proxy,
        } = config;

        let ifname = stack.ifname().to_string();
        let mac = stack.link_addr();
        let retry = Timer::new(clock.clone());

        Arp {
            requests_rx: stats.counter(&format!("{}.arp.requests_rx", ifname)),
            requests_tx: stats.counter(&format!("{}.arp.requests_tx", ifname)),
            replies_rx: stats.counter(&format!("{}.arp.replies_rx", ifname)),
            replies_tx: stats.counter(&format!("{}.arp.replies_tx", ifname)),
            stack,
            link,
            mac,
            cache: Cache::new(clock, flush_interval),
            waiting: PendingQueue::new(retry, retry_interval),
            proxy,
            passthrough_mac,
            max_retries,
        }
    }

    /// Handles one inbound ARP frame.
    ///
    /// Every parseable frame teaches the cache its sender binding and ships
    /// any packets parked behind the sender, before the opcode is even
    /// looked at. Malformed frames are dropped without a trace beyond a log
    /// line.
    pub fn receive(&mut self, frame: EthernetFrame) {
        trace!("arp handler got {} bytes of data", frame.payload().len());

        let hdr = match ArpFrame::try_from(frame) {
            Ok(hdr) => hdr,
            Err(reason) => {
                trace!("dropping inbound frame: {}", reason);
                return;
            }
        };

        let sender_ip = hdr.sender_ipv4_addr();
        let sender_mac = hdr.sender_mac_addr();

        self.cache.learn(sender_ip, sender_mac);

        // Always try to ship waiting packets when someone talks.
        if let Some(chain) = self.waiting.drain(sender_ip) {
            debug!("{} packet(s) were waiting for {}, sending", chain.len(), sender_ip);
            for queued in chain {
                self.link.send(queued, sender_mac, IPV4_ETHER_TYPE);
            }
        }

        match ArpOp::try_from(hdr.opcode()) {
            Ok(ArpOp::Request) => {
                self.requests_rx.fetch_add(1, Ordering::Relaxed);

                let target_ip = hdr.target_ipv4_addr();
                debug!("{} is looking for {}", sender_ip, target_ip);

                if target_ip == self.stack.ipv4_addr() {
                    // The request is for us. Respond.
                    self.respond(&hdr, target_ip);
                } else if self.routes_to(target_ip) {
                    // The request is for an IP we know a route to.
                    self.respond(&hdr, target_ip);
                } else {
                    trace!("no match for local address {}, drop", self.stack.ipv4_addr());
                }
            }
            Ok(ArpOp::Reply) => {
                self.replies_rx.fetch_add(1, Ordering::Relaxed);
                debug!("{} belongs to {}", sender_ip, sender_mac);
            }
            Err(_) => {
                trace!("unknown opcode");
            }
        }
    }

    /// Sends an IPv4 packet towards its next hop.
    ///
    /// A broadcast next-hop goes straight to the link broadcast address. On
    /// a cache hit the packet goes out immediately; on a miss it is parked
    /// in the pending queue and a resolution kicks off before this returns.
    pub fn transmit(&mut self, frame: EthernetFrame, next_hop: Ipv4Addr) {
        assert!(
            !frame.payload().is_empty(),
            "transmit of a frame with an empty payload"
        );

        let dest_mac = if next_hop == Ipv4Addr::BROADCAST {
            MacAddr::BROADCAST
        } else if let Some(mac) = self.passthrough_mac {
            mac
        } else if let Some(mac) = self.cache.lookup(next_hop) {
            trace!("found cache entry for {} -> {}", next_hop, mac);
            mac
        } else {
            debug!("no cache entry for {}, resolving", next_hop);
            self.await_resolution(frame, next_hop);
            return;
        };

        self.link.send(frame, dest_mac, IPV4_ETHER_TYPE);
    }

    /// Installs or replaces the proxy-ARP predicate.
    pub fn set_proxy(&mut self, routes: ProxyArp) {
        self.proxy = Some(routes);
    }

    /// Drops the cache and cancels the sweeper.
    pub fn flush(&mut self) {
        self.cache.clear();
    }

    /// Tears the module down: cancels both timers and releases every queued
    /// packet.
    pub fn stop(&mut self) {
        self.cache.clear();
        self.waiting.clear();
    }

    /// Runs whichever timer callbacks have fallen due.
    pub fn poll(&mut self) {
        if self.cache.sweep_due() {
            self.cache.flush_expired();
        }
        if self.waiting.retry_due() {
            self.resolve_waiting();
        }
    }

    /// The earliest instant at which [`Arp::poll`] has work to do, None when
    /// both timers are stopped.
    pub fn poll_at(&self) -> Option<Instant> {
        match (self.cache.sweep_at(), self.waiting.retry_at()) {
            (Some(sweep), Some(retry)) => Some(sweep.min(retry)),
            (sweep, retry) => sweep.or(retry),
        }
    }

    /// When the cache sweeper next fires; None while the cache is empty.
    pub fn cache_sweep_at(&self) -> Option<Instant> {
        self.cache.sweep_at()
    }

    /// When the resolution retry next fires; None while nothing is pending.
    pub fn retry_at(&self) -> Option<Instant> {
        self.waiting.retry_at()
    }

    /// Pure cache lookup; does not refresh the entry.
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.cache.lookup(ip)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// True while packets are parked behind `next_hop`. Hosts that want an
    /// upper bound on resolution (say, ICMP unreachable after N seconds)
    /// watch this.
    pub fn is_waiting(&self, next_hop: Ipv4Addr) -> bool {
        self.waiting.contains(next_hop)
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    fn routes_to(&self, target_ip: Ipv4Addr) -> bool {
        match &self.proxy {
            Some(routes) => routes(target_ip),
            None => false,
        }
    }

    /// Builds and unicasts a reply claiming `ack_ip` with the local MAC.
    fn respond(&mut self, hdr_in: &ArpFrame, ack_ip: Ipv4Addr) {
        self.replies_tx.fetch_add(1, Ordering::Relaxed);

        let mut reply = ArpFrame::prepare(self.stack.create_frame());
        reply
            .set_opcode(ArpOp::Reply)
            .set_sender_mac_addr(self.mac)
            .set_sender_ipv4_addr(ack_ip)
            .set_target_mac_addr(hdr_in.sender_mac_addr())
            .set_target_ipv4_addr(hdr_in.sender_ipv4_addr());

        let dest = hdr_in.sender_mac_addr();
        debug!("{} is at {}, replying to {}", ack_ip, self.mac, dest);

        self.link.send(reply.frame(), dest, ARP_ETHER_TYPE);
    }

    /// Builds and broadcasts a request for `next_hop`.
    fn resolve(&mut self, next_hop: Ipv4Addr) {
        debug!("resolving {}", next_hop);

        let mut request = ArpFrame::prepare(self.stack.create_frame());
        request
            .set_opcode(ArpOp::Request)
            .set_sender_mac_addr(self.mac)
            .set_sender_ipv4_addr(self.stack.ipv4_addr())
            .set_target_mac_addr(MacAddr::ZERO)
            .set_target_ipv4_addr(next_hop);

        self.requests_tx.fetch_add(1, Ordering::Relaxed);

        self.link.send(request.frame(), MacAddr::BROADCAST, ARP_ETHER_TYPE);
    }

    fn await_resolution(&mut self, frame: EthernetFrame, next_hop: Ipv4Addr) {
        if self.waiting.enqueue(next_hop, frame) {
            // First packet going to that IP: try resolution immediately,
            // the retry timer covers the rest.
            self.resolve(next_hop);
        }
    }

    /// Retry-timer callback: re-broadcast a request for every address still
    /// waiting, then re-arm while any remain.
    fn resolve_waiting(&mut self) {
        trace!("resolve timer doing sweep");

        if self.waiting.is_empty() {
            trace!("nothing to do, resolve timer stays stopped");
            self.waiting.stop_retry();
            return;
        }

        for next_hop in self.waiting.sweep_targets(self.max_retries) {
            self.resolve(next_hop);
        }

        if self.waiting.is_empty() {
            self.waiting.stop_retry();
        } else {
            self.waiting.rearm_retry();
        }
    }
}
