//! Switch port.

use crate::device::DeviceId;
use cherry_openflow::PortInfo;
use cherry_protocol::MacAddress;
use std::fmt;

/// A physical port of a [`crate::Device`].
///
/// The owning device is referenced by identifier; resolve it through a
/// [`crate::Finder`] when the device itself is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    device_id: DeviceId,
    info: PortInfo,
}

impl Port {
    pub(crate) fn new(device_id: DeviceId, info: PortInfo) -> Self {
        Self { device_id, info }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn number(&self) -> u32 {
        self.info.number
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn hw_addr(&self) -> MacAddress {
        self.info.hw_addr
    }

    pub fn info(&self) -> &PortInfo {
        &self.info
    }

    pub fn is_port_down(&self) -> bool {
        self.info.is_port_down()
    }

    pub fn is_link_down(&self) -> bool {
        self.info.is_link_down()
    }

    /// Administratively enabled with a link present.
    pub fn is_up(&self) -> bool {
        !self.is_port_down() && !self.is_link_down()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.info.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cherry_openflow::{OFPPC_PORT_DOWN, OFPPS_LINK_DOWN};
    use pretty_assertions::assert_eq;

    fn info(number: u32, config: u32, state: u32) -> PortInfo {
        PortInfo {
            number,
            hw_addr: MacAddress::new([0x02, 0, 0, 0, 0, number as u8]),
            name: format!("eth{}", number),
            config,
            state,
            curr_speed: 0,
        }
    }

    #[test]
    fn test_port_display() {
        let port = Port::new(DeviceId::new(0x1a), info(3, 0, 0));
        assert_eq!(port.to_string(), "000000000000001a/3");
        assert_eq!(port.name(), "eth3");
    }

    #[test]
    fn test_port_is_up() {
        let id = DeviceId::new(1);
        assert!(Port::new(id, info(1, 0, 0)).is_up());
        assert!(!Port::new(id, info(1, OFPPC_PORT_DOWN, 0)).is_up());
        assert!(!Port::new(id, info(1, 0, OFPPS_LINK_DOWN)).is_up());
    }
}
