//! Mock host pieces for exercising the module without a real stack: a
//! settable clock, a stack with a renumberable address, a link sink that
//! dumps every transmission into a channel so tests can compare them, and
//! builders for inbound ARP frames.

use crate::clock::Clock;
use crate::stack::{LinkTx, Stack};
use arp_rs_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Clock that only moves when told to.
pub struct MockClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl MockClock {
    pub fn new() -> MockClock {
        MockClock {
            base: Instant::now(),
            offset: Mutex::new(Duration::from_secs(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap();
        *offset += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

/// Stack stand-in with a fixed MAC and a settable IPv4 address.
pub struct MockStack {
    ifname: String,
    ipv4_addr: Mutex<Ipv4Addr>,
    link_addr: MacAddr,
}

impl MockStack {
    pub fn new(ifname: &str, ipv4_addr: Ipv4Addr, link_addr: MacAddr) -> MockStack {
        MockStack {
            ifname: ifname.to_string(),
            ipv4_addr: Mutex::new(ipv4_addr),
            link_addr,
        }
    }

    /// Renumbers the interface, as a host applying DHCP would.
    pub fn set_ipv4_addr(&self, ipv4_addr: Ipv4Addr) {
        *self.ipv4_addr.lock().unwrap() = ipv4_addr;
    }
}

impl Stack for MockStack {
    fn ifname(&self) -> &str {
        &self.ifname
    }

    fn ipv4_addr(&self) -> Ipv4Addr {
        *self.ipv4_addr.lock().unwrap()
    }

    fn link_addr(&self) -> MacAddr {
        self.link_addr
    }

    fn create_frame(&self) -> EthernetFrame {
        EthernetFrame::empty()
    }
}

/// One call into the link-layer sink, as the module made it.
#[derive(Clone)]
pub struct Transmission {
    pub frame: EthernetFrame,
    pub dest_mac: MacAddr,
    pub ether_type: u16,
}

/// Link sink that writes every transmission out to the provided channel, so
/// that frames may be compared in a test.
pub struct ChannelLink {
    transmissions: Sender<Transmission>,
}

impl ChannelLink {
    pub fn new() -> (ChannelLink, Receiver<Transmission>) {
        let (sender, receiver) = unbounded();
        (
            ChannelLink {
                transmissions: sender,
            },
            receiver,
        )
    }
}

impl LinkTx for ChannelLink {
    fn send(&self, frame: EthernetFrame, dest_mac: MacAddr, ether_type: u16) {
        if let Err(err) = self.transmissions.try_send(Transmission {
            frame,
            dest_mac,
            ether_type,
        }) {
            panic!("channel link: error sending to packet dump: {:?}", err);
        }
    }
}

/// An inbound ARP request as a peer would broadcast it.
pub fn arp_request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> EthernetFrame {
    let mut request = ArpFrame::prepare(EthernetFrame::empty());
    request
        .set_opcode(ArpOp::Request)
        .set_sender_mac_addr(sender_mac)
        .set_sender_ipv4_addr(sender_ip)
        .set_target_mac_addr(MacAddr::ZERO)
        .set_target_ipv4_addr(target_ip);

    let mut frame = request.frame();
    frame.set_src_mac(sender_mac);
    frame.set_dest_mac(MacAddr::BROADCAST);
    frame
}

/// An inbound ARP reply as a peer would unicast it back.
pub fn arp_reply(
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> EthernetFrame {
    let mut reply = ArpFrame::prepare(EthernetFrame::empty());
    reply
        .set_opcode(ArpOp::Reply)
        .set_sender_mac_addr(sender_mac)
        .set_sender_ipv4_addr(sender_ip)
        .set_target_mac_addr(target_mac)
        .set_target_ipv4_addr(target_ip);

    let mut frame = reply.frame();
    frame.set_src_mac(sender_mac);
    frame.set_dest_mac(target_mac);
    frame
}

/// A dummy IPv4 packet whose payload is filled with `tag`, so drain order
/// is visible to assertions.
pub fn ipv4_packet(tag: u8) -> EthernetFrame {
    let mut frame = EthernetFrame::empty();
    frame.set_payload(&[tag; 20]);
    frame
}
