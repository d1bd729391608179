//! Ethernet II framing.

use crate::{ensure_len, put_u16, MacAddress, Result};
use byteorder::{BigEndian, ByteOrder};

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_VLAN: u16 = 0x8100;
pub const ETHERTYPE_LLDP: u16 = 0x88cc;

const HEADER_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;

/// An Ethernet II frame without the trailing FCS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ethernet {
    pub dst: MacAddress,
    pub src: MacAddress,
    /// Tag control information of a single 802.1Q tag, if present.
    pub vlan_tci: Option<u16>,
    pub ether_type: u16,
    pub payload: Vec<u8>,
}

impl Ethernet {
    /// Creates an untagged frame.
    pub fn new(src: MacAddress, dst: MacAddress, ether_type: u16, payload: Vec<u8>) -> Self {
        Self {
            dst,
            src,
            vlan_tci: None,
            ether_type,
            payload,
        }
    }

    pub fn is_arp(&self) -> bool {
        self.ether_type == ETHERTYPE_ARP
    }

    pub fn is_lldp(&self) -> bool {
        self.ether_type == ETHERTYPE_LLDP
    }

    /// VLAN ID carried in the 802.1Q tag.
    pub fn vlan_id(&self) -> Option<u16> {
        self.vlan_tci.map(|tci| tci & 0x0fff)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        ensure_len("Ethernet header", buf, HEADER_LEN)?;

        let dst = MacAddress::from_slice(&buf[0..6])?;
        let src = MacAddress::from_slice(&buf[6..12])?;
        let mut ether_type = BigEndian::read_u16(&buf[12..14]);
        let mut offset = HEADER_LEN;
        let mut vlan_tci = None;

        if ether_type == ETHERTYPE_VLAN {
            ensure_len("802.1Q tag", buf, HEADER_LEN + VLAN_TAG_LEN)?;
            vlan_tci = Some(BigEndian::read_u16(&buf[14..16]));
            ether_type = BigEndian::read_u16(&buf[16..18]);
            offset += VLAN_TAG_LEN;
        }

        Ok(Self {
            dst,
            src,
            vlan_tci,
            ether_type,
            payload: buf[offset..].to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + VLAN_TAG_LEN + self.payload.len());
        buf.extend_from_slice(self.dst.as_bytes());
        buf.extend_from_slice(self.src.as_bytes());
        if let Some(tci) = self.vlan_tci {
            put_u16(&mut buf, ETHERTYPE_VLAN);
            put_u16(&mut buf, tci);
        }
        put_u16(&mut buf, self.ether_type);
        buf.extend_from_slice(&self.payload);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PacketError;
    use pretty_assertions::assert_eq;

    const HOST: MacAddress = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn test_decode_untagged() {
        let mut raw = vec![0xff; 6];
        raw.extend_from_slice(HOST.as_bytes());
        raw.extend_from_slice(&[0x08, 0x06, 0xde, 0xad]);

        let frame = Ethernet::decode(&raw).unwrap();
        assert_eq!(frame.dst, MacAddress::BROADCAST);
        assert_eq!(frame.src, HOST);
        assert!(frame.is_arp());
        assert_eq!(frame.vlan_id(), None);
        assert_eq!(frame.payload, vec![0xde, 0xad]);
        assert_eq!(frame.encode(), raw);
    }

    #[test]
    fn test_decode_vlan_tagged() {
        let mut raw = vec![0xff; 6];
        raw.extend_from_slice(HOST.as_bytes());
        raw.extend_from_slice(&[0x81, 0x00, 0x20, 0x64, 0x88, 0xcc, 0x01]);

        let frame = Ethernet::decode(&raw).unwrap();
        assert_eq!(frame.vlan_id(), Some(100));
        assert!(frame.is_lldp());
        assert_eq!(frame.payload, vec![0x01]);
        assert_eq!(frame.encode(), raw);
    }

    #[test]
    fn test_decode_truncated() {
        let err = Ethernet::decode(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, PacketError::Truncated { needed: 14, .. }));

        let mut tagged = vec![0u8; 12];
        tagged.extend_from_slice(&[0x81, 0x00, 0x00]);
        assert!(Ethernet::decode(&tagged).is_err());
    }
}
