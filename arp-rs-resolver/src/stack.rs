use arp_rs_packets::{EthernetFrame, MacAddr};
use std::net::Ipv4Addr;

/// Capabilities the owning stack lends to the ARP module.
///
/// The module holds a shared handle and never owns the stack; it reads the
/// IPv4 address fresh on every use (the host may renumber the interface),
/// while the link address is fixed and captured once at construction.
pub trait Stack: Send + Sync {
    /// Interface name, used to scope counter names.
    fn ifname(&self) -> &str;

    /// The interface's current IPv4 address.
    fn ipv4_addr(&self) -> Ipv4Addr;

    /// The interface's link-layer address.
    fn link_addr(&self) -> MacAddr;

    /// Returns an empty outbound frame buffer, sized for at least an ARP
    /// frame.
    fn create_frame(&self) -> EthernetFrame;
}

/// Synchronous link-layer transmit sink.
///
/// Takes ownership of the frame. The sink writes the Ethernet header
/// (destination, its own source MAC and the given Ethertype) before the
/// frame goes on the wire; whether it buffers internally is its affair.
pub trait LinkTx: Send + Sync {
    fn send(&self, frame: EthernetFrame, dest_mac: MacAddr, ether_type: u16);
}

/// Host-supplied route hint for proxy ARP.
///
/// Called on the receive path for requests that do not target the local
/// address; returning true means the host claims reachability for the
/// queried address and the module answers with the local MAC on its behalf.
/// Must be pure and fast.
pub type ProxyArp = Box<dyn Fn(Ipv4Addr) -> bool + Send + Sync>;
