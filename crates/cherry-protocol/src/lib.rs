//! Frame codecs used by the Cherry controller.
//!
//! This crate provides the packet-level building blocks the controller needs
//! to inspect packet-in payloads and to synthesize packet-out payloads:
//!
//! - [`MacAddress`]: 48-bit Ethernet hardware addresses
//! - [`Ethernet`]: Ethernet II frames (with an optional 802.1Q tag)
//! - [`Arp`]: ARP packets for Ethernet/IPv4
//! - [`Lldp`]: LLDP discovery frames (chassis ID, port ID, TTL)
//!
//! Every type decodes from a byte slice and encodes into a fresh `Vec<u8>`.
//! Decoding never panics on short or malformed input; it returns a
//! [`PacketError`] instead.

use byteorder::{BigEndian, ByteOrder};

mod arp;
mod ethernet;
mod lldp;
mod mac;

pub use arp::{Arp, ArpOperation, ARP_PACKET_LEN};
pub use ethernet::{Ethernet, ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_LLDP, ETHERTYPE_VLAN};
pub use lldp::{Lldp, LLDP_MULTICAST};
pub use mac::MacAddress;

/// Errors raised while decoding or encoding frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("truncated {what}: need {needed} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        needed: usize,
        actual: usize,
    },

    #[error("unsupported ARP: htype={htype:#06x} ptype={ptype:#06x} hlen={hlen} plen={plen}")]
    UnsupportedArp {
        htype: u16,
        ptype: u16,
        hlen: u8,
        plen: u8,
    },

    #[error("malformed LLDP frame: {0}")]
    MalformedLldp(String),

    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),
}

/// Result alias for frame operations.
pub type Result<T> = std::result::Result<T, PacketError>;

/// Checks that `buf` holds at least `needed` bytes.
pub(crate) fn ensure_len(what: &'static str, buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(PacketError::Truncated {
            what,
            needed,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Appends `value` to `buf` in network byte order.
pub(crate) fn put_u16(buf: &mut Vec<u8>, value: u16) {
    let mut field = [0u8; 2];
    BigEndian::write_u16(&mut field, value);
    buf.extend_from_slice(&field);
}
