use crate::error::Result;
use async_trait::async_trait;
use cherry_openflow::{
    DescReply, ErrorMsg, FeaturesReply, FlowRemoved, GetConfigReply, Hello, PacketIn,
    PortDescReply, PortStatus,
};

/// Reacts to the messages a switch sends on one connection.
///
/// Called sequentially in arrival order. Messages that need no protocol
/// reaction default to doing nothing.
#[async_trait]
pub trait MessageHandler: Send {
    async fn on_hello(&mut self, msg: &Hello) -> Result<()>;

    async fn on_error(&mut self, _msg: &ErrorMsg) -> Result<()> {
        Ok(())
    }

    async fn on_features_reply(&mut self, _msg: &FeaturesReply) -> Result<()> {
        Ok(())
    }

    async fn on_get_config_reply(&mut self, _msg: &GetConfigReply) -> Result<()> {
        Ok(())
    }

    async fn on_desc_reply(&mut self, msg: &DescReply) -> Result<()>;

    async fn on_port_desc_reply(&mut self, msg: &PortDescReply) -> Result<()>;

    async fn on_port_status(&mut self, msg: &PortStatus) -> Result<()>;

    async fn on_flow_removed(&mut self, _msg: &FlowRemoved) -> Result<()> {
        Ok(())
    }

    async fn on_packet_in(&mut self, _msg: &PacketIn) -> Result<()> {
        Ok(())
    }
}
