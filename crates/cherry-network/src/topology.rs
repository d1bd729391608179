//! Device registry, LLDP-learned links and the [`Finder`] view over them.

use crate::device::{Device, DeviceId};
use crate::port::Port;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One end of a link: a port on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub device: DeviceId,
    pub port: u32,
}

impl Endpoint {
    pub const fn new(device: DeviceId, port: u32) -> Self {
        Self { device, port }
    }
}

impl From<&Port> for Endpoint {
    fn from(port: &Port) -> Self {
        Self::new(port.device_id(), port.number())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}

/// Read-only lookups over the known devices and their connectivity.
///
/// Handed to northbound applications; nothing reachable through it mutates
/// the registry.
pub trait Finder: Send + Sync {
    fn device(&self, id: DeviceId) -> Option<Arc<Device>>;

    /// Every registered device, ordered by identifier.
    fn devices(&self) -> Vec<Arc<Device>>;

    fn port(&self, device: DeviceId, number: u32) -> Option<Port> {
        self.device(device).and_then(|d| d.port(number))
    }

    /// The far end of the link attached to `endpoint`, if one was discovered.
    fn neighbor(&self, endpoint: Endpoint) -> Option<Endpoint>;
}

/// Registry of live devices.
///
/// Sharded maps keep registration of one device from blocking lookups of
/// another.
#[derive(Debug, Default)]
pub struct Topology {
    devices: DashMap<DeviceId, Arc<Device>>,
    links: DashMap<Endpoint, Endpoint>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device, returning the instance it replaced, if any.
    pub fn add_device(&self, device: Arc<Device>) -> Option<Arc<Device>> {
        let id = device.id();
        let previous = self.devices.insert(id, device);
        if previous.is_some() {
            info!(device = %id, "device reconnected; replacing previous instance");
            self.remove_links(id);
        } else {
            info!(device = %id, "device registered");
        }
        previous
    }

    /// Removes `device` if it is still the registered instance for its ID.
    ///
    /// A newer connection with the same datapath ID is left in place.
    pub fn remove_device(&self, device: &Arc<Device>) -> bool {
        let id = device.id();
        let removed = self
            .devices
            .remove_if(&id, |_, current| Arc::ptr_eq(current, device))
            .is_some();
        if removed {
            self.remove_links(id);
            info!(device = %id, "device removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Records a bidirectional link between two endpoints.
    ///
    /// Either endpoint's previous link, if any, is replaced.
    pub fn add_link(&self, a: Endpoint, b: Endpoint) {
        for (end, other) in [(a, b), (b, a)] {
            if let Some((_, stale)) = self.links.remove(&end) {
                if stale != other {
                    self.links.remove_if(&stale, |_, v| *v == end);
                }
            }
        }
        self.links.insert(a, b);
        self.links.insert(b, a);
        debug!(from = %a, to = %b, "link discovered");
    }

    /// Drops every link that has an end on `device`.
    pub fn remove_links(&self, device: DeviceId) {
        self.links
            .retain(|from, to| from.device != device && to.device != device);
    }

    /// Every discovered link, each reported once, ordered by endpoint.
    pub fn links(&self) -> Vec<(Endpoint, Endpoint)> {
        let mut links: Vec<_> = self
            .links
            .iter()
            .filter(|e| e.key() < e.value())
            .map(|e| (*e.key(), *e.value()))
            .collect();
        links.sort();
        links
    }
}

impl Finder for Topology {
    fn device(&self, id: DeviceId) -> Option<Arc<Device>> {
        self.devices.get(&id).map(|d| d.value().clone())
    }

    fn devices(&self) -> Vec<Arc<Device>> {
        let mut devices: Vec<_> = self.devices.iter().map(|d| d.value().clone()).collect();
        devices.sort_by_key(|d| d.id());
        devices
    }

    fn neighbor(&self, endpoint: Endpoint) -> Option<Endpoint> {
        self.links.get(&endpoint).map(|e| *e.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cherry_openflow::{Message, MessageFactory, PortInfo, Version, Writer};
    use cherry_protocol::MacAddress;
    use pretty_assertions::assert_eq;

    struct DiscardWriter;

    #[async_trait]
    impl Writer for DiscardWriter {
        async fn write(&self, _msg: Message) -> cherry_openflow::Result<()> {
            Ok(())
        }
    }

    fn device(id: u64) -> Arc<Device> {
        let device = Device::new(
            DeviceId::new(id),
            Arc::new(MessageFactory::new(Version::Of13)),
            Arc::new(DiscardWriter),
        );
        device.add_port(PortInfo {
            number: 1,
            hw_addr: MacAddress::new([0x02, 0, 0, 0, 0, id as u8]),
            name: "eth1".to_string(),
            config: 0,
            state: 0,
            curr_speed: 0,
        });
        Arc::new(device)
    }

    #[test]
    fn test_finder_lookups() {
        let topology = Topology::new();
        topology.add_device(device(2));
        topology.add_device(device(1));

        let ids: Vec<_> = topology.devices().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![DeviceId::new(1), DeviceId::new(2)]);

        let port = topology.port(DeviceId::new(2), 1).unwrap();
        assert_eq!(port.device_id(), DeviceId::new(2));
        assert!(topology.port(DeviceId::new(2), 9).is_none());
        assert!(topology.device(DeviceId::new(3)).is_none());
    }

    #[test]
    fn test_remove_device_keeps_newer_instance() {
        let topology = Topology::new();
        let old = device(5);
        let new = device(5);

        topology.add_device(old.clone());
        assert!(topology.add_device(new.clone()).is_some());

        // The stale session closing must not evict the reconnected switch.
        assert!(!topology.remove_device(&old));
        assert_eq!(topology.len(), 1);

        assert!(topology.remove_device(&new));
        assert!(topology.is_empty());
    }

    #[test]
    fn test_links() {
        let topology = Topology::new();
        let a = Endpoint::new(DeviceId::new(1), 1);
        let b = Endpoint::new(DeviceId::new(2), 3);
        let c = Endpoint::new(DeviceId::new(3), 1);

        topology.add_link(a, b);
        assert_eq!(topology.neighbor(a), Some(b));
        assert_eq!(topology.neighbor(b), Some(a));
        assert_eq!(topology.links(), vec![(a, b)]);

        // Rewiring a to c forgets b's side of the old link.
        topology.add_link(a, c);
        assert_eq!(topology.neighbor(a), Some(c));
        assert_eq!(topology.neighbor(b), None);

        topology.remove_links(DeviceId::new(3));
        assert_eq!(topology.neighbor(a), None);
        assert!(topology.links().is_empty());
    }
}
