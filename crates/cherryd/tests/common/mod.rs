//! Shared harness for session integration tests
//!
//! Each test drives a [`Session`] directly with decoded messages and
//! inspects what it wrote through a [`RecordingWriter`].

#![allow(dead_code)]

use async_trait::async_trait;
use cherry_network::{Device, Finder, Port, Topology};
use cherry_openflow::{DescReply, Incoming, MessageFactory, PortInfo, Version};
use cherry_protocol::Ethernet;
use cherry_test::RecordingWriter;
use cherryd::{Controller, Pipeline, Processor, Propagation, Result, Session, SessionSettings};
use parking_lot::Mutex;
use std::sync::Arc;

/// Events seen by a [`Recorder`], rendered as short strings.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Processor that logs every event it receives and answers with a fixed
/// propagation.
pub struct Recorder {
    name: &'static str,
    log: EventLog,
    verdict: Propagation,
}

impl Recorder {
    pub fn new(name: &'static str, log: EventLog) -> Self {
        Self {
            name,
            log,
            verdict: Propagation::Continue,
        }
    }

    pub fn stopping(name: &'static str, log: EventLog) -> Self {
        Self {
            verdict: Propagation::Stop,
            ..Self::new(name, log)
        }
    }

    fn record(&self, event: String) -> Result<Propagation> {
        self.log.lock().push(format!("{}:{}", self.name, event));
        Ok(self.verdict)
    }
}

#[async_trait]
impl Processor for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    async fn on_packet_in(
        &self,
        _: &dyn Finder,
        ingress: &Port,
        eth: &Ethernet,
    ) -> Result<Propagation> {
        self.record(format!("packet_in {} {:04x}", ingress, eth.ether_type))
    }

    async fn on_device_up(&self, _: &dyn Finder, device: &Arc<Device>) -> Result<Propagation> {
        self.record(format!("device_up {}", device.id()))
    }

    async fn on_device_down(&self, _: &dyn Finder, device: &Arc<Device>) -> Result<Propagation> {
        self.record(format!("device_down {}", device.id()))
    }

    async fn on_port_updated(&self, _: &dyn Finder, port: &Port) -> Result<Propagation> {
        self.record(format!("port_updated {} up={}", port, port.is_up()))
    }
}

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn controller(pipeline: Pipeline) -> Controller {
    Controller::new(Arc::new(Topology::new()), pipeline, SessionSettings::default())
}

/// A session on `controller` for an OpenFlow 1.3 switch, with its writer.
pub fn open(controller: &Controller) -> (Session, Arc<RecordingWriter>) {
    open_with(controller, RecordingWriter::new())
}

pub fn open_with(
    controller: &Controller,
    writer: RecordingWriter,
) -> (Session, Arc<RecordingWriter>) {
    let writer = Arc::new(writer);
    let session = controller.open_session(
        Arc::new(MessageFactory::new(Version::Of13)),
        writer.clone(),
    );
    (session, writer)
}

/// Walks `session` through the whole handshake for `datapath_id`.
///
/// Everything written along the way is cleared from `writer`.
pub async fn connect(
    session: &mut Session,
    writer: &RecordingWriter,
    datapath_id: u64,
    desc: DescReply,
    ports: Vec<PortInfo>,
) {
    for msg in [
        Incoming::Hello(cherry_test::hello()),
        Incoming::FeaturesReply(cherry_test::features_reply(datapath_id)),
        Incoming::DescReply(desc),
        Incoming::PortDescReply(cherry_test::port_desc_reply(ports)),
    ] {
        session.handle(msg).await.unwrap();
    }
    writer.clear();
}

/// Ports 1 to 4, all up.
pub fn up_ports() -> Vec<PortInfo> {
    cherry_test::DEVICE_PORTS
        .into_iter()
        .map(cherry_test::port_info)
        .collect()
}
