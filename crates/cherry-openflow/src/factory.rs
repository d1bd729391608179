//! Version-aware message construction.

use crate::flow::{Action, FlowMod, FlowModCommand, Instruction, Match};
use crate::message::{
    BarrierRequest, DescRequest, FeaturesRequest, Hello, PacketOut, PortDescRequest, SetConfig,
};
use crate::{OpenflowError, Result};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Negotiated protocol version of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Of10,
    Of13,
}

impl Version {
    /// ofp_header.version value.
    pub const fn wire(&self) -> u8 {
        match self {
            Version::Of10 => 0x01,
            Version::Of13 => 0x04,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Of10 => write!(f, "1.0"),
            Version::Of13 => write!(f, "1.3"),
        }
    }
}

/// Constructs outbound messages for one negotiated protocol version.
///
/// Every constructor may fail with [`OpenflowError::Unsupported`] when the
/// version has no such message or object.
pub trait Factory: Send + Sync + fmt::Debug {
    fn version(&self) -> Version;

    fn new_hello(&self) -> Result<Hello>;

    fn new_set_config(&self) -> Result<SetConfig>;

    fn new_features_request(&self) -> Result<FeaturesRequest>;

    fn new_barrier_request(&self) -> Result<BarrierRequest>;

    fn new_flow_mod(&self, command: FlowModCommand) -> Result<FlowMod>;

    fn new_desc_request(&self) -> Result<DescRequest>;

    fn new_port_desc_request(&self) -> Result<PortDescRequest>;

    fn new_match(&self) -> Result<Match>;

    fn new_action(&self) -> Result<Action>;

    fn new_goto_table(&self, table_id: u8) -> Result<Instruction>;

    fn new_apply_actions(&self, action: Action) -> Result<Instruction>;

    fn new_packet_out(&self) -> Result<PacketOut>;
}

/// The stock [`Factory`] for OpenFlow 1.0 and 1.3.
///
/// Transaction IDs are allocated from a per-factory counter, so one factory
/// should be used per connection.
#[derive(Debug)]
pub struct MessageFactory {
    version: Version,
    xid: AtomicU32,
}

impl MessageFactory {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            xid: AtomicU32::new(1),
        }
    }

    fn next_xid(&self) -> u32 {
        self.xid.fetch_add(1, Ordering::Relaxed)
    }
}

impl Factory for MessageFactory {
    fn version(&self) -> Version {
        self.version
    }

    fn new_hello(&self) -> Result<Hello> {
        Ok(Hello {
            xid: self.next_xid(),
            version: self.version.wire(),
        })
    }

    fn new_set_config(&self) -> Result<SetConfig> {
        Ok(SetConfig::new(self.next_xid()))
    }

    fn new_features_request(&self) -> Result<FeaturesRequest> {
        Ok(FeaturesRequest {
            xid: self.next_xid(),
        })
    }

    fn new_barrier_request(&self) -> Result<BarrierRequest> {
        Ok(BarrierRequest {
            xid: self.next_xid(),
        })
    }

    fn new_flow_mod(&self, command: FlowModCommand) -> Result<FlowMod> {
        Ok(FlowMod::new(self.next_xid(), command))
    }

    fn new_desc_request(&self) -> Result<DescRequest> {
        Ok(DescRequest {
            xid: self.next_xid(),
        })
    }

    fn new_port_desc_request(&self) -> Result<PortDescRequest> {
        // OpenFlow 1.0 reports ports in FEATURES_REPLY instead.
        if self.version == Version::Of10 {
            return Err(OpenflowError::unsupported("PORT_DESCRIPTION_REQUEST", self.version));
        }
        Ok(PortDescRequest {
            xid: self.next_xid(),
        })
    }

    fn new_match(&self) -> Result<Match> {
        Ok(Match::default())
    }

    fn new_action(&self) -> Result<Action> {
        Ok(Action::default())
    }

    fn new_goto_table(&self, table_id: u8) -> Result<Instruction> {
        // Single flow table before 1.1.
        if self.version == Version::Of10 {
            return Err(OpenflowError::unsupported("GOTO_TABLE instruction", self.version));
        }
        Ok(Instruction::GotoTable(table_id))
    }

    fn new_apply_actions(&self, action: Action) -> Result<Instruction> {
        Ok(Instruction::ApplyActions(action))
    }

    fn new_packet_out(&self) -> Result<PacketOut> {
        Ok(PacketOut::new(self.next_xid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_xids_are_sequential() {
        let factory = MessageFactory::new(Version::Of13);
        let a = factory.new_barrier_request().unwrap();
        let b = factory.new_barrier_request().unwrap();
        assert_eq!(b.xid, a.xid + 1);
    }

    #[test]
    fn test_hello_carries_wire_version() {
        let factory = MessageFactory::new(Version::Of13);
        assert_eq!(factory.new_hello().unwrap().version, 0x04);
    }

    #[test]
    fn test_of10_rejects_multi_table_features() {
        let factory = MessageFactory::new(Version::Of10);

        let err = factory.new_goto_table(100).unwrap_err();
        assert_eq!(err.to_string(), "GOTO_TABLE instruction is not supported by OpenFlow 1.0");
        assert!(factory.new_port_desc_request().is_err());

        // Output actions exist in every version.
        assert!(factory.new_apply_actions(Action::default()).is_ok());
    }
}
