use super::handler::MessageHandler;
use super::of13::Of13Controller;
use super::SessionSettings;
use crate::error::{ControllerError, Result};
use crate::northbound::Pipeline;
use cherry_network::{Device, DeviceId, Endpoint, Finder, Topology};
use cherry_openflow::{Factory, FeaturesReply, Incoming, PacketIn, Writer};
use cherry_protocol::{Ethernet, Lldp};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One switch connection.
///
/// Messages are handled one at a time in arrival order. The device is
/// registered on FEATURES_REPLY and announced to the pipeline once its ports
/// are known; it is removed again when the session ends.
pub struct Session {
    handler: Of13Controller,
    factory: Arc<dyn Factory>,
    writer: Arc<dyn Writer>,
    topology: Arc<Topology>,
    pipeline: Arc<Pipeline>,
    cancel: CancellationToken,
    device: Option<Arc<Device>>,
    device_up: bool,
}

impl Session {
    pub fn new(
        factory: Arc<dyn Factory>,
        writer: Arc<dyn Writer>,
        topology: Arc<Topology>,
        pipeline: Arc<Pipeline>,
        settings: SessionSettings,
        cancel: CancellationToken,
    ) -> Self {
        let handler =
            Of13Controller::new(factory.clone(), writer.clone(), settings, cancel.clone());
        Self {
            handler,
            factory,
            writer,
            topology,
            pipeline,
            cancel,
            device: None,
            device_up: false,
        }
    }

    /// The switch registered by this session, once FEATURES_REPLY arrived.
    pub fn device(&self) -> Option<&Arc<Device>> {
        self.device.as_ref()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Handles messages until the channel closes, the session is cancelled
    /// or a fatal error occurs.
    pub async fn run(mut self, mut messages: mpsc::Receiver<Incoming>) -> Result<()> {
        let result = loop {
            let msg = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Ok(()),
                msg = messages.recv() => match msg {
                    Some(msg) => msg,
                    None => break Ok(()),
                },
            };
            let name = msg.name();
            match self.handle(msg).await {
                Ok(()) => {}
                Err(ControllerError::Cancelled) => break Ok(()),
                Err(e) if e.is_fatal() => {
                    error!(
                        device = ?self.device_id(),
                        message = name,
                        error = %e,
                        "closing session"
                    );
                    break Err(e);
                }
                Err(e) => {
                    warn!(
                        device = ?self.device_id(),
                        message = name,
                        error = %e,
                        "failed to handle message"
                    );
                }
            }
        };
        self.close().await;
        result
    }

    /// Handles a single message.
    pub async fn handle(&mut self, msg: Incoming) -> Result<()> {
        match msg {
            Incoming::Hello(m) => self.handler.on_hello(&m).await,
            Incoming::Error(m) => self.handler.on_error(&m).await,
            Incoming::FeaturesReply(m) => {
                self.register(&m);
                self.handler.on_features_reply(&m).await
            }
            Incoming::GetConfigReply(m) => self.handler.on_get_config_reply(&m).await,
            Incoming::DescReply(m) => {
                if let Some(device) = &self.device {
                    device.set_description(m.clone());
                }
                self.handler.on_desc_reply(&m).await
            }
            Incoming::PortDescReply(m) => {
                self.handler.on_port_desc_reply(&m).await?;
                self.activate().await
            }
            Incoming::PortStatus(m) => {
                self.handler.on_port_status(&m).await?;
                self.port_changed(m.port.number).await
            }
            Incoming::FlowRemoved(m) => self.handler.on_flow_removed(&m).await,
            Incoming::PacketIn(m) => {
                self.handler.on_packet_in(&m).await?;
                self.packet_in(&m).await
            }
        }
    }

    fn device_id(&self) -> Option<DeviceId> {
        self.device.as_ref().map(|d| d.id())
    }

    fn register(&mut self, msg: &FeaturesReply) {
        let id = DeviceId::new(msg.datapath_id);
        if let Some(device) = &self.device {
            if device.id() != id {
                warn!(
                    device = %device.id(),
                    reported = %id,
                    "datapath ID changed mid-session; ignored"
                );
            }
            return;
        }

        let device = Arc::new(Device::new(id, self.factory.clone(), self.writer.clone()));
        self.topology.add_device(device.clone());
        self.handler.set_device(device.clone());
        self.device = Some(device);
        info!(
            device = %id,
            n_tables = msg.n_tables,
            n_buffers = msg.n_buffers,
            version = %self.factory.version(),
            "switch connected"
        );
    }

    /// Fires device-up the first time the port set is known.
    async fn activate(&mut self) -> Result<()> {
        if self.device_up {
            return Ok(());
        }
        let Some(device) = self.device.clone() else {
            return Ok(());
        };
        self.device_up = true;
        info!(device = %device.id(), ports = device.port_count(), "device up");
        self.pipeline
            .on_device_up(self.topology.as_ref(), &device)
            .await?;
        Ok(())
    }

    async fn port_changed(&self, number: u32) -> Result<()> {
        if !self.device_up {
            return Ok(());
        }
        let Some(port) = self.device.as_ref().and_then(|d| d.port(number)) else {
            return Ok(());
        };
        self.pipeline
            .on_port_updated(self.topology.as_ref(), &port)
            .await?;
        Ok(())
    }

    async fn packet_in(&self, msg: &PacketIn) -> Result<()> {
        let Some(device) = &self.device else {
            debug!(port = msg.in_port, "PACKET_IN before FEATURES_REPLY; dropped");
            return Ok(());
        };
        let eth = Ethernet::decode(&msg.data)?;
        if eth.is_lldp() {
            return self.learn_link(device, msg.in_port, &eth);
        }

        let Some(ingress) = device.port(msg.in_port) else {
            debug!(
                device = %device.id(),
                port = msg.in_port,
                "PACKET_IN from untracked port; dropped"
            );
            return Ok(());
        };
        self.pipeline
            .on_packet_in(self.topology.as_ref(), &ingress, &eth)
            .await?;
        Ok(())
    }

    /// Records the link a discovery frame travelled over. LLDP never reaches
    /// the pipeline.
    fn learn_link(&self, device: &Device, in_port: u32, eth: &Ethernet) -> Result<()> {
        let lldp = Lldp::decode(&eth.payload)?;
        let Some(remote) = parse_discovery_ids(&lldp) else {
            debug!(
                device = %device.id(),
                chassis = %lldp.chassis_id,
                port = %lldp.port_id,
                "ignoring foreign LLDP frame"
            );
            return Ok(());
        };
        if self.topology.port(remote.device, remote.port).is_none() {
            debug!(device = %device.id(), remote = %remote, "LLDP from unknown endpoint; ignored");
            return Ok(());
        }
        if device.port(in_port).is_none() {
            debug!(device = %device.id(), port = in_port, "LLDP on untracked port; ignored");
            return Ok(());
        }

        self.topology
            .add_link(Endpoint::new(device.id(), in_port), remote);
        Ok(())
    }

    async fn close(&mut self) {
        let Some(device) = self.device.take() else {
            return;
        };
        if !self.topology.remove_device(&device) {
            debug!(device = %device.id(), "device already replaced by a newer session");
            return;
        }
        if self.device_up {
            info!(device = %device.id(), "device down");
            if let Err(e) = self
                .pipeline
                .on_device_down(self.topology.as_ref(), &device)
                .await
            {
                warn!(device = %device.id(), error = %e, "device down handling failed");
            }
        }
    }
}

/// Chassis and port IDs as written by [`super::Of13Controller`]: the datapath
/// ID in 16 hex digits and the decimal port number.
fn parse_discovery_ids(lldp: &Lldp) -> Option<Endpoint> {
    let chassis = &lldp.chassis_id;
    if chassis.len() != 16 || !chassis.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if lldp.port_id.is_empty() || !lldp.port_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let datapath_id = u64::from_str_radix(chassis, 16).ok()?;
    let port = lldp.port_id.parse().ok()?;
    Some(Endpoint::new(DeviceId::new(datapath_id), port))
}
