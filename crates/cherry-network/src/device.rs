//! Switch device.

use crate::port::Port;
use cherry_openflow::{DescReply, Factory, Message, PortInfo, Writer, OFPP_MAX};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Datapath ID of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u64);

impl DeviceId {
    pub const fn new(datapath_id: u64) -> Self {
        Self(datapath_id)
    }

    pub const fn datapath_id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DeviceId {
    fn from(datapath_id: u64) -> Self {
        Self(datapath_id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// One live switch connection.
///
/// A device exclusively owns its ports. The port set and description sit
/// behind the device's own locks; the default flow table is atomic.
pub struct Device {
    id: DeviceId,
    factory: Arc<dyn Factory>,
    writer: Arc<dyn Writer>,
    flow_table_id: AtomicU8,
    ports: RwLock<BTreeMap<u32, Port>>,
    description: RwLock<Option<DescReply>>,
}

impl Device {
    pub fn new(id: DeviceId, factory: Arc<dyn Factory>, writer: Arc<dyn Writer>) -> Self {
        Self {
            id,
            factory,
            writer,
            flow_table_id: AtomicU8::new(0),
            ports: RwLock::new(BTreeMap::new()),
            description: RwLock::new(None),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Message factory of the connection's negotiated version.
    pub fn factory(&self) -> &dyn Factory {
        self.factory.as_ref()
    }

    /// Table that holds the table-miss entry sending packets to the controller.
    pub fn flow_table_id(&self) -> u8 {
        self.flow_table_id.load(Ordering::Acquire)
    }

    pub fn set_flow_table_id(&self, table_id: u8) {
        self.flow_table_id.store(table_id, Ordering::Release);
    }

    pub fn description(&self) -> Option<DescReply> {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: DescReply) {
        *self.description.write() = Some(description);
    }

    /// Tracks a port, replacing any previous state for the same number.
    ///
    /// Reserved port numbers (above `OFPP_MAX`) are ignored and `None` is
    /// returned.
    pub fn add_port(&self, info: PortInfo) -> Option<Port> {
        if info.number > OFPP_MAX {
            debug!(device = %self.id, port = info.number, "ignoring reserved port number");
            return None;
        }
        let port = Port::new(self.id, info);
        self.ports.write().insert(port.number(), port.clone());
        Some(port)
    }

    /// Applies a port status change in place. Same contract as [`Device::add_port`].
    pub fn update_port(&self, info: PortInfo) -> Option<Port> {
        self.add_port(info)
    }

    pub fn port(&self, number: u32) -> Option<Port> {
        self.ports.read().get(&number).cloned()
    }

    /// Snapshot of every tracked port, ordered by number.
    pub fn ports(&self) -> Vec<Port> {
        self.ports.read().values().cloned().collect()
    }

    pub fn port_count(&self) -> usize {
        self.ports.read().len()
    }

    pub async fn send_message(&self, msg: impl Into<Message>) -> cherry_openflow::Result<()> {
        let msg = msg.into();
        debug!(device = %self.id, message = %msg, "sending message");
        self.writer.write(msg).await
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("version", &self.factory.version())
            .field("flow_table_id", &self.flow_table_id())
            .field("ports", &self.port_count())
            .finish()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}
