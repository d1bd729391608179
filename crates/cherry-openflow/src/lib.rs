//! OpenFlow message model for the Cherry controller.
//!
//! This crate describes *what* the controller sends to and receives from a
//! switch, not how it is framed on the wire. Encoding belongs to the
//! transport layer that implements [`Writer`].
//!
//! - [`Factory`]: constructs outbound messages for a negotiated [`Version`];
//!   construction fails for kinds the version does not support
//! - [`Writer`]: transmits a fully populated [`Message`] on one connection
//! - [`Incoming`]: asynchronous and reply messages delivered by a switch
//! - [`FlowMod`], [`Match`], [`Instruction`], [`Action`]: flow programming
//!
//! # Example
//!
//! ```
//! use cherry_openflow::{Factory, FlowModCommand, MessageFactory, Version};
//!
//! let factory = MessageFactory::new(Version::Of13);
//! let mut flow = factory.new_flow_mod(FlowModCommand::Add).unwrap();
//! flow.table_id = 0;
//! flow.priority = 0;
//! assert!(flow.flow_match.is_wildcard());
//! ```

mod factory;
mod flow;
mod incoming;
mod message;
mod writer;

pub use factory::{Factory, MessageFactory, Version};
pub use flow::{Action, FlowMod, FlowModCommand, InPort, Instruction, Match, OutPort};
pub use incoming::{
    DescReply, ErrorMsg, FeaturesReply, FlowRemoved, GetConfigReply, Incoming, PacketIn,
    PortDescReply, PortInfo, PortReason, PortStatus,
};
pub use message::{
    BarrierRequest, DescRequest, FeaturesRequest, Hello, Message, PacketOut, PortDescRequest,
    SetConfig,
};
pub use writer::Writer;

/// Maximum number of a physical switch port; larger values are reserved.
pub const OFPP_MAX: u32 = 0xffff_ff00;
/// Send out of the ingress port.
pub const OFPP_IN_PORT: u32 = 0xffff_fff8;
/// Flood along the spanning tree, excluding the ingress port.
pub const OFPP_FLOOD: u32 = 0xffff_fffb;
/// All ports except the ingress port.
pub const OFPP_ALL: u32 = 0xffff_fffc;
/// Send to the controller.
pub const OFPP_CONTROLLER: u32 = 0xffff_fffd;
/// Wildcard port used in flow deletion and statistics requests.
pub const OFPP_ANY: u32 = 0xffff_ffff;

/// Wildcard group.
pub const OFPG_ANY: u32 = 0xffff_ffff;
/// Every flow table.
pub const OFPTT_ALL: u8 = 0xff;
/// Packet-in carries the full packet; no buffering on the switch.
pub const OFPCML_NO_BUFFER: u16 = 0xffff;
/// Packet is not buffered on the switch.
pub const OFP_NO_BUFFER: u32 = 0xffff_ffff;
/// No special fragment handling.
pub const OFPC_FRAG_NORMAL: u16 = 0;

/// Port is administratively down.
pub const OFPPC_PORT_DOWN: u32 = 1 << 0;
/// No physical link present.
pub const OFPPS_LINK_DOWN: u32 = 1 << 0;

/// Errors raised by message construction and transmission.
#[derive(Debug, thiserror::Error)]
pub enum OpenflowError {
    #[error("{kind} is not supported by OpenFlow {version}")]
    Unsupported { kind: &'static str, version: Version },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OpenflowError {
    pub fn unsupported(kind: &'static str, version: Version) -> Self {
        OpenflowError::Unsupported { kind, version }
    }
}

/// Result alias for OpenFlow operations.
pub type Result<T> = std::result::Result<T, OpenflowError>;
