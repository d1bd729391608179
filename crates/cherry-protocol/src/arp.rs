//! ARP for Ethernet/IPv4 (RFC 826).
//!
//! ```text
//! +---------------+---------------+-------+-------+---------------+
//! | Hardware Type | Protocol Type | HLen  | PLen  |   Operation   |
//! +---------------+---------------+-------+-------+---------------+
//! | Sender Hardware Address (6)   | Sender Protocol Address (4)   |
//! +-------------------------------+-------------------------------+
//! | Target Hardware Address (6)   | Target Protocol Address (4)   |
//! +-------------------------------+-------------------------------+
//! ```

use crate::{ensure_len, put_u16, MacAddress, PacketError, Result};
use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;
const HLEN_ETHERNET: u8 = 6;
const PLEN_IPV4: u8 = 4;

/// Length of an Ethernet/IPv4 ARP packet.
pub const ARP_PACKET_LEN: usize = 28;

/// ARP operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArpOperation {
    Request,
    Reply,
    /// Any other code (RARP, InARP, ...). Kept so it can be logged.
    Other(u16),
}

impl ArpOperation {
    pub const fn code(&self) -> u16 {
        match self {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
            ArpOperation::Other(code) => *code,
        }
    }
}

impl From<u16> for ArpOperation {
    fn from(code: u16) -> Self {
        match code {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            other => ArpOperation::Other(other),
        }
    }
}

/// An Ethernet/IPv4 ARP packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arp {
    pub operation: ArpOperation,
    /// Sender hardware address.
    pub sha: MacAddress,
    /// Sender protocol address.
    pub spa: Ipv4Addr,
    /// Target hardware address.
    pub tha: MacAddress,
    /// Target protocol address.
    pub tpa: Ipv4Addr,
}

impl Arp {
    /// "Who has `tpa`? Tell `spa`."
    pub fn request(sha: MacAddress, spa: Ipv4Addr, tpa: Ipv4Addr) -> Self {
        Self {
            operation: ArpOperation::Request,
            sha,
            spa,
            tha: MacAddress::ZERO,
            tpa,
        }
    }

    /// "`spa` is at `sha`", addressed to `tha`/`tpa`.
    pub fn reply(sha: MacAddress, spa: Ipv4Addr, tha: MacAddress, tpa: Ipv4Addr) -> Self {
        Self {
            operation: ArpOperation::Reply,
            sha,
            spa,
            tha,
            tpa,
        }
    }

    /// A self-directed request asserting that `ip` is at `mac` (RFC 5227).
    pub fn announcement(mac: MacAddress, ip: Ipv4Addr) -> Self {
        Self::request(mac, ip, ip)
    }

    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }

    /// Sender and target protocol addresses are equal and the target
    /// hardware address is all-zero.
    pub fn is_announcement(&self) -> bool {
        self.spa == self.tpa && self.tha.is_zero()
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len("ARP packet", buf, ARP_PACKET_LEN)?;

        let htype = BigEndian::read_u16(&buf[0..2]);
        let ptype = BigEndian::read_u16(&buf[2..4]);
        let hlen = buf[4];
        let plen = buf[5];
        if htype != HTYPE_ETHERNET
            || ptype != PTYPE_IPV4
            || hlen != HLEN_ETHERNET
            || plen != PLEN_IPV4
        {
            return Err(PacketError::UnsupportedArp {
                htype,
                ptype,
                hlen,
                plen,
            });
        }

        Ok(Self {
            operation: ArpOperation::from(BigEndian::read_u16(&buf[6..8])),
            sha: MacAddress::from_slice(&buf[8..14])?,
            spa: ipv4(&buf[14..18]),
            tha: MacAddress::from_slice(&buf[18..24])?,
            tpa: ipv4(&buf[24..28]),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ARP_PACKET_LEN);
        put_u16(&mut buf, HTYPE_ETHERNET);
        put_u16(&mut buf, PTYPE_IPV4);
        buf.push(HLEN_ETHERNET);
        buf.push(PLEN_IPV4);
        put_u16(&mut buf, self.operation.code());
        buf.extend_from_slice(self.sha.as_bytes());
        buf.extend_from_slice(&self.spa.octets());
        buf.extend_from_slice(self.tha.as_bytes());
        buf.extend_from_slice(&self.tpa.octets());
        buf
    }
}

fn ipv4(buf: &[u8]) -> Ipv4Addr {
    Ipv4Addr::new(buf[0], buf[1], buf[2], buf[3])
}
