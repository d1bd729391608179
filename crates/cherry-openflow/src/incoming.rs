//! Switch-to-controller messages, already decoded by the transport layer.

use crate::message::Hello;
use crate::{OFPPC_PORT_DOWN, OFPPS_LINK_DOWN};
use cherry_protocol::MacAddress;
use std::fmt;

/// ERROR notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMsg {
    pub xid: u32,
    pub error_type: u16,
    pub code: u16,
    /// Leading bytes of the offending request.
    pub data: Vec<u8>,
}

impl fmt::Display for ErrorMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "xid={} type={} code={}",
            self.xid, self.error_type, self.code
        )
    }
}

/// FEATURES_REPLY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturesReply {
    pub xid: u32,
    pub datapath_id: u64,
    pub n_buffers: u32,
    pub n_tables: u8,
    pub auxiliary_id: u8,
    pub capabilities: u32,
}

/// GET_CONFIG_REPLY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetConfigReply {
    pub xid: u32,
    pub flags: u16,
    pub miss_send_len: u16,
}

/// Switch description (OFPMP_DESC reply). Free-text fields identify the
/// hardware vendor and model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescReply {
    pub xid: u32,
    pub manufacturer: String,
    pub hardware: String,
    pub software: String,
    pub serial: String,
    pub datapath: String,
}

/// One entry of a port description or port status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub number: u32,
    pub hw_addr: MacAddress,
    pub name: String,
    /// OFPPC_* bits.
    pub config: u32,
    /// OFPPS_* bits.
    pub state: u32,
    /// Current speed in kbps.
    pub curr_speed: u32,
}

impl PortInfo {
    pub fn is_port_down(&self) -> bool {
        self.config & OFPPC_PORT_DOWN != 0
    }

    pub fn is_link_down(&self) -> bool {
        self.state & OFPPS_LINK_DOWN != 0
    }
}

/// Port description reply (OFPMP_PORT_DESC).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortDescReply {
    pub xid: u32,
    pub ports: Vec<PortInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortReason {
    Add,
    Delete,
    Modify,
}

/// PORT_STATUS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub xid: u32,
    pub reason: PortReason,
    pub port: PortInfo,
}

/// FLOW_REMOVED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRemoved {
    pub xid: u32,
    pub cookie: u64,
    pub priority: u16,
    pub reason: u8,
    pub table_id: u8,
    pub duration_sec: u32,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
}

/// PACKET_IN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub xid: u32,
    pub buffer_id: u32,
    pub reason: u8,
    pub table_id: u8,
    pub cookie: u64,
    pub in_port: u32,
    /// Ethernet frame as received by the switch.
    pub data: Vec<u8>,
}

/// Every message a session accepts from a switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Hello(Hello),
    Error(ErrorMsg),
    FeaturesReply(FeaturesReply),
    GetConfigReply(GetConfigReply),
    DescReply(DescReply),
    PortDescReply(PortDescReply),
    PortStatus(PortStatus),
    FlowRemoved(FlowRemoved),
    PacketIn(PacketIn),
}

impl Incoming {
    pub fn name(&self) -> &'static str {
        match self {
            Incoming::Hello(_) => "HELLO",
            Incoming::Error(_) => "ERROR",
            Incoming::FeaturesReply(_) => "FEATURES_REPLY",
            Incoming::GetConfigReply(_) => "GET_CONFIG_REPLY",
            Incoming::DescReply(_) => "DESCRIPTION_REPLY",
            Incoming::PortDescReply(_) => "PORT_DESCRIPTION_REPLY",
            Incoming::PortStatus(_) => "PORT_STATUS",
            Incoming::FlowRemoved(_) => "FLOW_REMOVED",
            Incoming::PacketIn(_) => "PACKET_IN",
        }
    }
}
