//! # What is this for?
//!
//! This crate implements the ARP side of an IPv4 network stack attached to a
//! single Ethernet-class link. It learns IPv4-to-MAC bindings from every ARP
//! frame that arrives, answers requests for the local address (or for proxied
//! addresses the host claims a route to), queues outbound packets while a
//! next-hop resolves, and re-broadcasts requests on a retry cadence. The host
//! stack hands frames in via [`Arp::receive`] and [`Arp::transmit`] and drives
//! the two software timers through [`Arp::poll_at`] / [`Arp::poll`]; nothing
//! in here blocks or suspends.
//!
//! The host supplies its side of the contract as capability handles: a
//! [`Stack`] for addresses and frame buffers, a [`LinkTx`] sink for finished
//! frames, a [`Clock`] for monotonic time, and a [`StatRegistry`] that owns
//! the protocol counters.

mod arp;
pub use self::arp::*;

mod clock;
pub use self::clock::*;

mod config;
pub use self::config::*;

mod stack;
pub use self::stack::*;

mod stats;
pub use self::stats::*;

mod timer;
pub use self::timer::*;

/// Utility module
pub mod utils;
