//! Outbound controller-to-switch messages.

use crate::flow::{Action, FlowMod, InPort};
use crate::{OFPC_FRAG_NORMAL, OFPCML_NO_BUFFER, OFP_NO_BUFFER};
use std::fmt;

/// HELLO. Sent by both sides when a connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hello {
    pub xid: u32,
    /// Highest wire version the sender supports.
    pub version: u8,
}

/// SET_CONFIG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetConfig {
    pub xid: u32,
    pub flags: u16,
    /// Maximum bytes of a table-miss packet sent to the controller.
    pub miss_send_len: u16,
}

impl SetConfig {
    pub(crate) fn new(xid: u32) -> Self {
        Self {
            xid,
            flags: OFPC_FRAG_NORMAL,
            miss_send_len: OFPCML_NO_BUFFER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturesRequest {
    pub xid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierRequest {
    pub xid: u32,
}

/// Switch description request (OFPMP_DESC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescRequest {
    pub xid: u32,
}

/// Port description request (OFPMP_PORT_DESC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDescRequest {
    pub xid: u32,
}

/// PACKET_OUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    pub xid: u32,
    pub buffer_id: u32,
    pub in_port: InPort,
    pub action: Option<Action>,
    /// Full Ethernet frame to transmit.
    pub data: Vec<u8>,
}

impl PacketOut {
    pub(crate) fn new(xid: u32) -> Self {
        Self {
            xid,
            buffer_id: OFP_NO_BUFFER,
            in_port: InPort::Controller,
            action: None,
            data: Vec::new(),
        }
    }
}

/// A fully populated message ready for a [`crate::Writer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello(Hello),
    SetConfig(SetConfig),
    FeaturesRequest(FeaturesRequest),
    BarrierRequest(BarrierRequest),
    FlowMod(FlowMod),
    DescRequest(DescRequest),
    PortDescRequest(PortDescRequest),
    PacketOut(PacketOut),
}

impl Message {
    /// Protocol name of the message type, as used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Hello(_) => "HELLO",
            Message::SetConfig(_) => "SET_CONFIG",
            Message::FeaturesRequest(_) => "FEATURES_REQUEST",
            Message::BarrierRequest(_) => "BARRIER_REQUEST",
            Message::FlowMod(_) => "FLOW_MOD",
            Message::DescRequest(_) => "DESCRIPTION_REQUEST",
            Message::PortDescRequest(_) => "PORT_DESCRIPTION_REQUEST",
            Message::PacketOut(_) => "PACKET_OUT",
        }
    }

    pub fn xid(&self) -> u32 {
        match self {
            Message::Hello(m) => m.xid,
            Message::SetConfig(m) => m.xid,
            Message::FeaturesRequest(m) => m.xid,
            Message::BarrierRequest(m) => m.xid,
            Message::FlowMod(m) => m.xid,
            Message::DescRequest(m) => m.xid,
            Message::PortDescRequest(m) => m.xid,
            Message::PacketOut(m) => m.xid,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(xid={})", self.name(), self.xid())
    }
}

macro_rules! impl_from_message {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Message {
                fn from(msg: $variant) -> Self {
                    Message::$variant(msg)
                }
            }
        )*
    };
}

impl_from_message!(
    Hello,
    SetConfig,
    FeaturesRequest,
    BarrierRequest,
    FlowMod,
    DescRequest,
    PortDescRequest,
    PacketOut,
);
