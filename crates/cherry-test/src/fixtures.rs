//! Test fixtures for switch replies, ports and frames
//!
//! Addresses are locally administered (02:..) unless a test passes its own.

use crate::RecordingWriter;
use cherry_network::{Device, DeviceId};
use cherry_openflow::{
    DescReply, FeaturesReply, Hello, MessageFactory, PacketIn, PortDescReply, PortInfo, Version,
    OFPPC_PORT_DOWN, OFPPS_LINK_DOWN, OFP_NO_BUFFER,
};
use cherry_protocol::{
    Arp, Ethernet, Lldp, MacAddress, ETHERTYPE_ARP, ETHERTYPE_IPV4, ETHERTYPE_LLDP, LLDP_MULTICAST,
};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Ports every fixture device starts with.
pub const DEVICE_PORTS: [u32; 4] = [1, 2, 3, 4];

/// Switch description fixtures
pub mod desc {
    use super::*;

    pub fn reply(manufacturer: &str, hardware: &str) -> DescReply {
        DescReply {
            xid: 0,
            manufacturer: manufacturer.to_string(),
            hardware: hardware.to_string(),
            software: "test".to_string(),
            serial: "None".to_string(),
            datapath: "None".to_string(),
        }
    }

    pub fn hp_2920() -> DescReply {
        reply("HP", "2920-24G")
    }

    pub fn as4600() -> DescReply {
        reply("Accton", "AS4600-54T")
    }

    pub fn generic() -> DescReply {
        reply("Nicira, Inc.", "Open vSwitch")
    }
}

pub fn hello() -> Hello {
    Hello { xid: 0, version: 0x04 }
}

pub fn features_reply(datapath_id: u64) -> FeaturesReply {
    FeaturesReply {
        xid: 0,
        datapath_id,
        n_buffers: 256,
        n_tables: 254,
        auxiliary_id: 0,
        capabilities: 0,
    }
}

/// Hardware address of port `number` in fixtures.
pub fn port_mac(number: u32) -> MacAddress {
    let [_, _, hi, lo] = number.to_be_bytes();
    MacAddress::new([0x02, 0, 0, 0, hi, lo])
}

/// An administratively up port with a link.
pub fn port_info(number: u32) -> PortInfo {
    PortInfo {
        number,
        hw_addr: port_mac(number),
        name: format!("eth{}", number),
        config: 0,
        state: 0,
        curr_speed: 1_000_000,
    }
}

pub fn port_info_admin_down(number: u32) -> PortInfo {
    PortInfo {
        config: OFPPC_PORT_DOWN,
        ..port_info(number)
    }
}

pub fn port_info_link_down(number: u32) -> PortInfo {
    PortInfo {
        state: OFPPS_LINK_DOWN,
        ..port_info(number)
    }
}

pub fn port_desc_reply(ports: impl IntoIterator<Item = PortInfo>) -> PortDescReply {
    PortDescReply {
        xid: 0,
        ports: ports.into_iter().collect(),
    }
}

pub fn packet_in(in_port: u32, data: Vec<u8>) -> PacketIn {
    PacketIn {
        xid: 0,
        buffer_id: OFP_NO_BUFFER,
        reason: 0,
        table_id: 0,
        cookie: u64::MAX,
        in_port,
        data,
    }
}

/// A registered-looking device with [`DEVICE_PORTS`], all up.
pub fn device(datapath_id: u64, writer: Arc<RecordingWriter>) -> Arc<Device> {
    let device = Device::new(
        DeviceId::new(datapath_id),
        Arc::new(MessageFactory::new(Version::Of13)),
        writer,
    );
    for number in DEVICE_PORTS {
        device.add_port(port_info(number));
    }
    Arc::new(device)
}

/// Broadcast ARP request from `sha`/`spa` for `tpa`.
pub fn arp_request_frame(sha: MacAddress, spa: Ipv4Addr, tpa: Ipv4Addr) -> Vec<u8> {
    let arp = Arp::request(sha, spa, tpa);
    Ethernet::new(sha, MacAddress::BROADCAST, ETHERTYPE_ARP, arp.encode()).encode()
}

/// Gratuitous ARP announcing `mac` owns `ip`.
pub fn arp_announcement_frame(mac: MacAddress, ip: Ipv4Addr) -> Vec<u8> {
    let arp = Arp::announcement(mac, ip);
    Ethernet::new(mac, MacAddress::BROADCAST, ETHERTYPE_ARP, arp.encode()).encode()
}

pub fn arp_reply_frame(sha: MacAddress, spa: Ipv4Addr, tha: MacAddress, tpa: Ipv4Addr) -> Vec<u8> {
    let arp = Arp::reply(sha, spa, tha, tpa);
    Ethernet::new(sha, tha, ETHERTYPE_ARP, arp.encode()).encode()
}

/// An IPv4 frame with an opaque payload.
pub fn ipv4_frame(src: MacAddress, dst: MacAddress) -> Vec<u8> {
    let payload = vec![0x45, 0, 0, 20, 0, 0, 0, 0, 64, 17, 0, 0, 10, 0, 0, 1, 10, 0, 0, 2];
    Ethernet::new(src, dst, ETHERTYPE_IPV4, payload).encode()
}

/// Discovery frame as the controller sends it out of `port` on `datapath_id`.
pub fn lldp_frame(datapath_id: u64, port: u32) -> Vec<u8> {
    let lldp = Lldp::new(DeviceId::new(datapath_id).to_string(), port.to_string(), 120);
    let payload = lldp.encode().expect("fixture LLDP IDs are short");
    Ethernet::new(port_mac(port), LLDP_MULTICAST, ETHERTYPE_LLDP, payload).encode()
}
