//! Flow programming primitives: match, actions, instructions and FLOW_MOD.

use crate::{OFPG_ANY, OFPP_ALL, OFPP_ANY, OFPP_CONTROLLER, OFPP_FLOOD, OFPP_IN_PORT, OFP_NO_BUFFER};
use cherry_protocol::MacAddress;

/// Output port of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutPort {
    /// A physical port number.
    Physical(u32),
    Flood,
    All,
    Controller,
    InPort,
}

impl OutPort {
    /// Wire value of the port.
    pub const fn value(&self) -> u32 {
        match self {
            OutPort::Physical(n) => *n,
            OutPort::Flood => OFPP_FLOOD,
            OutPort::All => OFPP_ALL,
            OutPort::Controller => OFPP_CONTROLLER,
            OutPort::InPort => OFPP_IN_PORT,
        }
    }
}

/// Logical ingress port of a PACKET_OUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InPort {
    Physical(u32),
    Controller,
}

impl InPort {
    pub const fn value(&self) -> u32 {
        match self {
            InPort::Physical(n) => *n,
            InPort::Controller => OFPP_CONTROLLER,
        }
    }
}

/// Flow match. Every unset field is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub in_port: Option<u32>,
    pub eth_type: Option<u16>,
    pub eth_src: Option<MacAddress>,
    pub eth_dst: Option<MacAddress>,
}

impl Match {
    pub fn is_wildcard(&self) -> bool {
        self == &Match::default()
    }
}

/// An action set. Only output actions are needed by the controller core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    output: Option<OutPort>,
}

impl Action {
    pub fn set_out_port(&mut self, port: OutPort) {
        self.output = Some(port);
    }

    pub fn out_port(&self) -> Option<OutPort> {
        self.output
    }
}

/// A flow instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Continue matching in a later table.
    GotoTable(u8),
    /// Apply the action set immediately.
    ApplyActions(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowModCommand {
    Add,
    Modify,
    ModifyStrict,
    Delete,
    DeleteStrict,
}

/// FLOW_MOD message.
///
/// Fields are public; [`crate::Factory::new_flow_mod`] fills in the
/// protocol defaults (no buffer, any output port/group, wildcard match).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub xid: u32,
    pub command: FlowModCommand,
    pub cookie: u64,
    pub cookie_mask: u64,
    pub table_id: u8,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: u32,
    pub out_port: u32,
    pub out_group: u32,
    pub flags: u16,
    pub flow_match: Match,
    pub instruction: Option<Instruction>,
}

impl FlowMod {
    pub(crate) fn new(xid: u32, command: FlowModCommand) -> Self {
        Self {
            xid,
            command,
            cookie: 0,
            cookie_mask: 0,
            table_id: 0,
            idle_timeout: 0,
            hard_timeout: 0,
            priority: 0,
            buffer_id: OFP_NO_BUFFER,
            out_port: OFPP_ANY,
            out_group: OFPG_ANY,
            flags: 0,
            flow_match: Match::default(),
            instruction: None,
        }
    }

    /// No idle and no hard timeout.
    pub fn is_permanent(&self) -> bool {
        self.idle_timeout == 0 && self.hard_timeout == 0
    }
}
