//! LLDP discovery frames (IEEE 802.1AB).
//!
//! Only the three mandatory TLVs are produced: chassis ID and port ID (both
//! with the "locally assigned" subtype) and time-to-live. Decoding accepts
//! any TLV order and skips optional TLVs.

use crate::{ensure_len, put_u16, MacAddress, PacketError, Result};
use byteorder::{BigEndian, ByteOrder};

/// Nearest-bridge group address; frames sent here are never forwarded by
/// 802.1D bridges.
pub const LLDP_MULTICAST: MacAddress = MacAddress::new([0x01, 0x80, 0xc2, 0x00, 0x00, 0x0e]);

const TLV_END: u8 = 0;
const TLV_CHASSIS_ID: u8 = 1;
const TLV_PORT_ID: u8 = 2;
const TLV_TTL: u8 = 3;
const SUBTYPE_LOCAL: u8 = 7;
const MAX_TLV_VALUE: usize = 511;

/// The mandatory part of an LLDP data unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lldp {
    pub chassis_id: String,
    pub port_id: String,
    pub ttl: u16,
}

impl Lldp {
    pub fn new(chassis_id: impl Into<String>, port_id: impl Into<String>, ttl: u16) -> Self {
        Self {
            chassis_id: chassis_id.into(),
            port_id: port_id.into(),
            ttl,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.chassis_id.len() + self.port_id.len() + 16);
        put_tlv(&mut buf, TLV_CHASSIS_ID, &local_id(&self.chassis_id))?;
        put_tlv(&mut buf, TLV_PORT_ID, &local_id(&self.port_id))?;
        put_tlv(&mut buf, TLV_TTL, &self.ttl.to_be_bytes())?;
        put_tlv(&mut buf, TLV_END, &[])?;
        Ok(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut chassis_id = None;
        let mut port_id = None;
        let mut ttl = None;

        let mut rest = buf;
        while !rest.is_empty() {
            ensure_len("LLDP TLV header", rest, 2)?;
            let header = BigEndian::read_u16(&rest[0..2]);
            let tlv_type = (header >> 9) as u8;
            let len = usize::from(header & 0x01ff);
            ensure_len("LLDP TLV value", &rest[2..], len)?;
            let value = &rest[2..2 + len];
            rest = &rest[2 + len..];

            match tlv_type {
                TLV_END => break,
                TLV_CHASSIS_ID => chassis_id = Some(decode_id("chassis ID", value)?),
                TLV_PORT_ID => port_id = Some(decode_id("port ID", value)?),
                TLV_TTL => {
                    ensure_len("LLDP TTL", value, 2)?;
                    ttl = Some(BigEndian::read_u16(value));
                }
                _ => {}
            }
        }

        let missing = |tlv: &str| PacketError::MalformedLldp(format!("missing {tlv} TLV"));
        Ok(Self {
            chassis_id: chassis_id.ok_or_else(|| missing("chassis ID"))?,
            port_id: port_id.ok_or_else(|| missing("port ID"))?,
            ttl: ttl.ok_or_else(|| missing("TTL"))?,
        })
    }
}

fn local_id(id: &str) -> Vec<u8> {
    let mut value = Vec::with_capacity(id.len() + 1);
    value.push(SUBTYPE_LOCAL);
    value.extend_from_slice(id.as_bytes());
    value
}

fn put_tlv(buf: &mut Vec<u8>, tlv_type: u8, value: &[u8]) -> Result<()> {
    if value.len() > MAX_TLV_VALUE {
        return Err(PacketError::MalformedLldp(format!(
            "TLV {tlv_type} value is {} bytes, limit is {MAX_TLV_VALUE}",
            value.len()
        )));
    }
    // Length fits in 9 bits after the check above.
    let header = (u16::from(tlv_type) << 9) | value.len() as u16;
    put_u16(buf, header);
    buf.extend_from_slice(value);
    Ok(())
}

/// Locally assigned IDs are text; anything else (MAC, network address, ...)
/// is rendered as colon-separated hex.
fn decode_id(what: &str, value: &[u8]) -> Result<String> {
    let (subtype, id) = value
        .split_first()
        .ok_or_else(|| PacketError::MalformedLldp(format!("empty {what} TLV")))?;
    if *subtype == SUBTYPE_LOCAL {
        return Ok(String::from_utf8_lossy(id).into_owned());
    }
    Ok(id
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_layout() {
        let raw = Lldp::new("dp1", "7", 120).encode().unwrap();
        // chassis: type 1, len 4, subtype 7, "dp1"
        assert_eq!(&raw[0..6], &[0x02, 0x04, 7, b'd', b'p', b'1']);
        // port: type 2, len 2, subtype 7, "7"
        assert_eq!(&raw[6..10], &[0x04, 0x02, 7, b'7']);
        // ttl: type 3, len 2, 120
        assert_eq!(&raw[10..14], &[0x06, 0x02, 0x00, 120]);
        // end
        assert_eq!(&raw[14..], &[0x00, 0x00]);
    }

    #[test]
    fn test_decode_own_frame() {
        let sent = Lldp::new("0x000000000000000a", "3", 120);
        let decoded = Lldp::decode(&sent.encode().unwrap()).unwrap();
        assert_eq!(decoded, sent);
    }

    #[test]
    fn test_decode_foreign_subtypes_and_optional_tlvs() {
        let raw = [
            0x02, 0x07, 4, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // chassis: MAC subtype
            0x04, 0x03, 5, b'e', b'1', // port: interface name subtype
            0x06, 0x02, 0x00, 0x78, // ttl
            0x0a, 0x02, b's', b'w', // system name, skipped
            0x00, 0x00,
        ];
        let decoded = Lldp::decode(&raw).unwrap();
        assert_eq!(decoded.chassis_id, "00:11:22:33:44:55");
        assert_eq!(decoded.port_id, "65:31");
        assert_eq!(decoded.ttl, 120);
    }

    #[test]
    fn test_decode_missing_ttl() {
        let raw = [0x02, 0x02, 7, b'a', 0x04, 0x02, 7, b'1', 0x00, 0x00];
        assert!(matches!(
            Lldp::decode(&raw),
            Err(PacketError::MalformedLldp(msg)) if msg.contains("TTL")
        ));
    }

    #[test]
    fn test_decode_truncated_value() {
        let raw = [0x02, 0x10, 7, b'a'];
        assert!(matches!(
            Lldp::decode(&raw),
            Err(PacketError::Truncated { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_oversized_id() {
        let id = "x".repeat(600);
        assert!(Lldp::new(id, "1", 120).encode().is_err());
    }
}
