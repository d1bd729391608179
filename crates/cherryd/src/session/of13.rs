//! OpenFlow 1.3 handshake and default flow state.

use super::handler::MessageHandler;
use super::profile::SwitchProfile;
use super::SessionSettings;
use crate::error::{ControllerError, Result};
use async_trait::async_trait;
use cherry_network::{Device, Port};
use cherry_openflow::{
    DescReply, ErrorMsg, Factory, FlowMod, FlowModCommand, Hello, InPort, Instruction, Message,
    OpenflowError, OutPort, PortDescReply, PortStatus, Writer, OFPTT_ALL,
};
use cherry_protocol::{Ethernet, Lldp, ETHERTYPE_LLDP, LLDP_MULTICAST};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cookie of every table-miss entry; the MSB marks the entry as table-miss.
pub const TABLE_MISS_COOKIE: u64 = 1 << 63;

/// One message sent by the controller when a switch says hello.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeStep {
    Hello,
    SetConfig,
    FeaturesRequest,
    Barrier,
    RemoveAllFlows,
    DescRequest,
    PortDescRequest,
}

impl HandshakeStep {
    /// Protocol name of the message the step sends.
    pub const fn name(&self) -> &'static str {
        match self {
            HandshakeStep::Hello => "HELLO",
            HandshakeStep::SetConfig => "SET_CONFIG",
            HandshakeStep::FeaturesRequest => "FEATURES_REQUEST",
            HandshakeStep::Barrier => "BARRIER_REQUEST",
            HandshakeStep::RemoveAllFlows => "FLOW_MOD",
            HandshakeStep::DescRequest => "DESCRIPTION_REQUEST",
            HandshakeStep::PortDescRequest => "PORT_DESCRIPTION_REQUEST",
        }
    }
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Messages sent in response to HELLO, in order.
///
/// The barrier after the flush keeps the flush ahead of the table-miss
/// entries installed on DESCRIPTION_REPLY. The barrier after the description
/// request keeps DESCRIPTION_REPLY ahead of PORT_DESCRIPTION_REPLY.
pub const HANDSHAKE_SEQUENCE: [HandshakeStep; 9] = [
    HandshakeStep::Hello,
    HandshakeStep::SetConfig,
    HandshakeStep::FeaturesRequest,
    HandshakeStep::Barrier,
    HandshakeStep::RemoveAllFlows,
    HandshakeStep::Barrier,
    HandshakeStep::DescRequest,
    HandshakeStep::Barrier,
    HandshakeStep::PortDescRequest,
];

/// Protocol-level state machine for one OpenFlow 1.3 connection.
///
/// Brings the switch into a controller-owned state: stale flows flushed,
/// table-miss entries pointing at the controller, ports tracked on the
/// [`Device`] and discovery LLDP sent out of every live port.
pub struct Of13Controller {
    factory: Arc<dyn Factory>,
    writer: Arc<dyn Writer>,
    settings: SessionSettings,
    cancel: CancellationToken,
    device: Option<Arc<Device>>,
}

impl Of13Controller {
    pub fn new(
        factory: Arc<dyn Factory>,
        writer: Arc<dyn Writer>,
        settings: SessionSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            factory,
            writer,
            settings,
            cancel,
            device: None,
        }
    }

    pub fn set_device(&mut self, device: Arc<Device>) {
        self.device = Some(device);
    }

    fn require_device(&self, message: &'static str) -> Result<Arc<Device>> {
        self.device
            .clone()
            .ok_or(ControllerError::OutOfOrder(message))
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }
        Ok(())
    }

    fn build_step(&self, step: HandshakeStep) -> cherry_openflow::Result<Message> {
        let f = self.factory.as_ref();
        let msg = match step {
            HandshakeStep::Hello => f.new_hello()?.into(),
            HandshakeStep::SetConfig => {
                let mut config = f.new_set_config()?;
                config.miss_send_len = self.settings.miss_send_len;
                config.into()
            }
            HandshakeStep::FeaturesRequest => f.new_features_request()?.into(),
            HandshakeStep::Barrier => f.new_barrier_request()?.into(),
            HandshakeStep::RemoveAllFlows => {
                let mut flow = f.new_flow_mod(FlowModCommand::Delete)?;
                flow.table_id = OFPTT_ALL;
                flow.flow_match = f.new_match()?;
                flow.into()
            }
            HandshakeStep::DescRequest => f.new_desc_request()?.into(),
            HandshakeStep::PortDescRequest => f.new_port_desc_request()?.into(),
        };
        Ok(msg)
    }

    /// Sends [`HANDSHAKE_SEQUENCE`]. Stops at the first failure; nothing is retried.
    pub async fn handshake(&self) -> Result<()> {
        for step in HANDSHAKE_SEQUENCE {
            self.check_cancelled()?;
            let send_err = |source: OpenflowError| ControllerError::Send {
                step: step.name(),
                source,
            };
            let msg = self.build_step(step).map_err(send_err)?;
            self.writer.write(msg).await.map_err(send_err)?;
            debug!(step = %step, "handshake step sent");
        }
        Ok(())
    }

    fn output_to_controller(&self) -> cherry_openflow::Result<Instruction> {
        let mut action = self.factory.new_action()?;
        action.set_out_port(OutPort::Controller);
        self.factory.new_apply_actions(action)
    }

    fn table_miss_flow(
        &self,
        table_id: u8,
        instruction: cherry_openflow::Result<Instruction>,
    ) -> cherry_openflow::Result<FlowMod> {
        let instruction = instruction?;
        let mut flow = self.factory.new_flow_mod(FlowModCommand::Add)?;
        flow.cookie = TABLE_MISS_COOKIE;
        flow.table_id = table_id;
        flow.idle_timeout = 0;
        flow.hard_timeout = 0;
        flow.priority = 0;
        flow.flow_match = self.factory.new_match()?;
        flow.instruction = Some(instruction);
        Ok(flow)
    }

    async fn set_table_miss(
        &self,
        table_id: u8,
        instruction: cherry_openflow::Result<Instruction>,
    ) -> Result<()> {
        let table_miss_err =
            |source: OpenflowError| ControllerError::TableMiss { table_id, source };
        let flow = self
            .table_miss_flow(table_id, instruction)
            .map_err(table_miss_err)?;
        self.check_cancelled()?;
        self.writer.write(flow.into()).await.map_err(table_miss_err)
    }

    async fn install_table_miss(&self, device: &Device, profile: SwitchProfile) -> Result<()> {
        match profile {
            SwitchProfile::Hp2920 => {
                self.set_table_miss(0, self.factory.new_goto_table(100)).await?;
                self.set_table_miss(100, self.factory.new_goto_table(200)).await?;
                self.set_table_miss(200, self.output_to_controller()).await?;
            }
            SwitchProfile::As4600 => {
                // Known switch defect: any table-miss entry on table 0 after
                // the flush fails with TABLE_FULL. Packets that miss every
                // flow are not sent to the controller on this model.
                warn!(device = %device.id(), "AS4600-54T detected; no table-miss entry installed");
            }
            SwitchProfile::Generic => {
                self.set_table_miss(0, self.output_to_controller()).await?;
            }
        }
        if let Some(table_id) = profile.default_table() {
            device.set_flow_table_id(table_id);
        }
        Ok(())
    }

    /// Sends a discovery frame out of `port`, identifying this device and port.
    async fn send_lldp(&self, device: &Device, port: &Port) -> Result<()> {
        let lldp = Lldp::new(
            device.id().to_string(),
            port.number().to_string(),
            self.settings.lldp_ttl_secs,
        );
        let frame = Ethernet::new(port.hw_addr(), LLDP_MULTICAST, ETHERTYPE_LLDP, lldp.encode()?);

        let mut action = self.factory.new_action()?;
        action.set_out_port(OutPort::Physical(port.number()));
        let mut packet_out = self.factory.new_packet_out()?;
        packet_out.in_port = InPort::Controller;
        packet_out.action = Some(action);
        packet_out.data = frame.encode();

        self.writer.write(packet_out.into()).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageHandler for Of13Controller {
    async fn on_hello(&mut self, msg: &Hello) -> Result<()> {
        debug!(peer_version = msg.version, version = %self.factory.version(), "HELLO received");
        self.handshake().await
    }

    async fn on_error(&mut self, msg: &ErrorMsg) -> Result<()> {
        warn!(error = %msg, "switch reported an error");
        Ok(())
    }

    async fn on_desc_reply(&mut self, msg: &DescReply) -> Result<()> {
        let device = self.require_device("DESCRIPTION_REPLY")?;
        let profile = SwitchProfile::from(msg);
        info!(
            device = %device.id(),
            manufacturer = %msg.manufacturer,
            hardware = %msg.hardware,
            software = %msg.software,
            profile = %profile,
            "switch description received"
        );
        self.install_table_miss(&device, profile).await
    }

    async fn on_port_desc_reply(&mut self, msg: &PortDescReply) -> Result<()> {
        let device = self.require_device("PORT_DESCRIPTION_REPLY")?;
        for info in &msg.ports {
            let Some(port) = device.add_port(info.clone()) else {
                continue;
            };
            debug!(
                device = %device.id(),
                port = port.number(),
                admin_up = !port.is_port_down(),
                link_up = !port.is_link_down(),
                "port"
            );
            if port.is_up() {
                if let Err(e) = self.send_lldp(&device, &port).await {
                    warn!(
                        device = %device.id(),
                        port = port.number(),
                        error = %e,
                        "failed to send LLDP"
                    );
                }
            }
        }
        Ok(())
    }

    async fn on_port_status(&mut self, msg: &PortStatus) -> Result<()> {
        let Some(device) = &self.device else {
            debug!(port = msg.port.number, "PORT_STATUS before FEATURES_REPLY; ignored");
            return Ok(());
        };
        if let Some(port) = device.update_port(msg.port.clone()) {
            debug!(
                device = %device.id(),
                port = port.number(),
                reason = ?msg.reason,
                up = port.is_up(),
                "port status changed"
            );
        }
        Ok(())
    }
}
