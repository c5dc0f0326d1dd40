use crate::{EthernetFrame, MacAddr, ARP_ETHER_TYPE};
use std::convert::{TryFrom, TryInto};
use std::net::Ipv4Addr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

impl TryFrom<u16> for ArpOp {
    type Error = &'static str;

    fn try_from(opcode: u16) -> Result<Self, Self::Error> {
        match opcode {
            1 => Ok(ArpOp::Request),
            2 => Ok(ArpOp::Reply),
            _ => Err("Unknown ARP opcode"),
        }
    }
}

pub enum ArpHardwareType {
    Ethernet = 1,
}

/// Fixed field layout for IPv4-over-Ethernet ARP: 6-byte hardware
/// addresses, 4-byte protocol addresses, 28 bytes in total.
const HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
const PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
const HARDWARE_ADDR_LEN_RANGE: (usize, usize) = (4, 5);
const PROTOCOL_ADDR_LEN_RANGE: (usize, usize) = (5, 6);
const OPCODE_RANGE: (usize, usize) = (6, 8);
const SENDER_HARDWARE_ADDR_RANGE: (usize, usize) = (8, 14);
const SENDER_PROTOCOL_ADDR_RANGE: (usize, usize) = (14, 18);
const TARGET_HARDWARE_ADDR_RANGE: (usize, usize) = (18, 24);
const TARGET_PROTOCOL_ADDR_RANGE: (usize, usize) = (24, 28);

pub const ARP_PAYLOAD_LEN: usize = 28;
pub const ARP_PROTOCOL_TYPE_IPV4: u16 = 0x0800;

///
/// EthernetFrame wrapper with getters/setters for the IPv4-over-Ethernet
/// packet structure described in RFC 826.
///
#[derive(Clone)]
pub struct ArpFrame {
    frame: EthernetFrame,
}

impl ArpFrame {
    ///
    /// Takes an outbound frame buffer, writes the fixed ARP header fields
    /// (hardware/protocol types and lengths, ARP Ethertype) over a zeroed
    /// 28-byte payload, and returns the frame ready for the variable fields.
    ///
    pub fn prepare(mut frame: EthernetFrame) -> Self {
        let payload = [0u8; ARP_PAYLOAD_LEN];
        frame.set_payload(&payload);
        frame.set_ether_type(ARP_ETHER_TYPE);

        let mut arp_frame = ArpFrame { frame };
        arp_frame
            .set_hardware_type(ArpHardwareType::Ethernet as u16)
            .set_protocol_type(ARP_PROTOCOL_TYPE_IPV4);
        let (start, end) = HARDWARE_ADDR_LEN_RANGE;
        arp_frame.set_arp_data(&[6], start, end);
        let (start, end) = PROTOCOL_ADDR_LEN_RANGE;
        arp_frame.set_arp_data(&[4], start, end);
        arp_frame
    }

    pub fn hardware_type(&self) -> u16 {
        let (start, end) = HARDWARE_TYPE_RANGE;
        u16::from_be_bytes(self.arp_data(start, end).try_into().unwrap())
    }

    pub fn protocol_type(&self) -> u16 {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        u16::from_be_bytes(self.arp_data(start, end).try_into().unwrap())
    }

    pub fn hardware_addr_len(&self) -> u8 {
        self.arp_data(HARDWARE_ADDR_LEN_RANGE.0, HARDWARE_ADDR_LEN_RANGE.1)[0]
    }

    pub fn protocol_addr_len(&self) -> u8 {
        self.arp_data(PROTOCOL_ADDR_LEN_RANGE.0, PROTOCOL_ADDR_LEN_RANGE.1)[0]
    }

    pub fn opcode(&self) -> u16 {
        let (start, end) = OPCODE_RANGE;
        u16::from_be_bytes(self.arp_data(start, end).try_into().unwrap())
    }

    pub fn sender_mac_addr(&self) -> MacAddr {
        let (start, end) = SENDER_HARDWARE_ADDR_RANGE;
        MacAddr::new(self.arp_data(start, end).try_into().unwrap())
    }

    pub fn sender_ipv4_addr(&self) -> Ipv4Addr {
        let (start, end) = SENDER_PROTOCOL_ADDR_RANGE;
        let bytes: [u8; 4] = self.arp_data(start, end).try_into().unwrap();
        Ipv4Addr::from(bytes)
    }

    pub fn target_mac_addr(&self) -> MacAddr {
        let (start, end) = TARGET_HARDWARE_ADDR_RANGE;
        MacAddr::new(self.arp_data(start, end).try_into().unwrap())
    }

    pub fn target_ipv4_addr(&self) -> Ipv4Addr {
        let (start, end) = TARGET_PROTOCOL_ADDR_RANGE;
        let bytes: [u8; 4] = self.arp_data(start, end).try_into().unwrap();
        Ipv4Addr::from(bytes)
    }

    pub fn set_hardware_type(&mut self, htype: u16) -> &mut Self {
        let (start, end) = HARDWARE_TYPE_RANGE;
        self.set_arp_data(&htype.to_be_bytes(), start, end)
    }

    pub fn set_protocol_type(&mut self, ptype: u16) -> &mut Self {
        let (start, end) = PROTOCOL_TYPE_RANGE;
        self.set_arp_data(&ptype.to_be_bytes(), start, end)
    }

    pub fn set_opcode(&mut self, op: ArpOp) -> &mut Self {
        let (start, end) = OPCODE_RANGE;
        self.set_arp_data(&(op as u16).to_be_bytes(), start, end)
    }

    pub fn set_sender_mac_addr(&mut self, addr: MacAddr) -> &mut Self {
        let (start, end) = SENDER_HARDWARE_ADDR_RANGE;
        self.set_arp_data(&addr.bytes, start, end)
    }

    pub fn set_sender_ipv4_addr(&mut self, addr: Ipv4Addr) -> &mut Self {
        let (start, end) = SENDER_PROTOCOL_ADDR_RANGE;
        self.set_arp_data(&addr.octets(), start, end)
    }

    pub fn set_target_mac_addr(&mut self, addr: MacAddr) -> &mut Self {
        let (start, end) = TARGET_HARDWARE_ADDR_RANGE;
        self.set_arp_data(&addr.bytes, start, end)
    }

    pub fn set_target_ipv4_addr(&mut self, addr: Ipv4Addr) -> &mut Self {
        let (start, end) = TARGET_PROTOCOL_ADDR_RANGE;
        self.set_arp_data(&addr.octets(), start, end)
    }

    // Move ownership of the frame back to the caller
    pub fn frame(self) -> EthernetFrame {
        self.frame
    }

    /// Private Methods

    // Returns the bytes in the ethernet frame between start and end, exclusive
    fn arp_data(&self, start: usize, end: usize) -> &[u8] {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        &self.frame.data[frame_offset_start..frame_offset_end]
    }

    fn set_arp_data(&mut self, bytes: &[u8], start: usize, end: usize) -> &mut Self {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        self.frame.data[frame_offset_start..frame_offset_end].copy_from_slice(bytes);
        self
    }
}

impl Default for ArpFrame {
    fn default() -> Self {
        ArpFrame::prepare(EthernetFrame::empty())
    }
}

impl TryFrom<EthernetFrame> for ArpFrame {
    type Error = &'static str;

    ///
    /// Decorates the given EthernetFrame with ArpFrame getters/setters.
    /// Validates
    /// - The frame has an ARP ether type
    /// - The payload holds a full 28-byte IPv4-over-Ethernet ARP header
    /// - The hardware and protocol type/length fields match that format
    ///
    fn try_from(frame: EthernetFrame) -> Result<Self, Self::Error> {
        if frame.ether_type() != ARP_ETHER_TYPE {
            return Err("Frame does not have ARP ether type");
        };

        let arp_frame = ArpFrame { frame };

        if arp_frame.frame.payload().len() < ARP_PAYLOAD_LEN {
            return Err("Frame payload is too small");
        }
        if arp_frame.hardware_type() != ArpHardwareType::Ethernet as u16 {
            return Err("Frame is not Ethernet ARP");
        }
        if arp_frame.protocol_type() != ARP_PROTOCOL_TYPE_IPV4 {
            return Err("Frame is not IPv4 ARP");
        }
        if arp_frame.hardware_addr_len() != 6 || arp_frame.protocol_addr_len() != 4 {
            return Err("Frame address length fields are not 6/4");
        }

        Ok(arp_frame)
    }
}
