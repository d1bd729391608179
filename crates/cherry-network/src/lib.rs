//! In-memory network model for the Cherry controller.
//!
//! - [`Device`]: one live switch connection and the ports it owns
//! - [`Port`]: a physical interface, pointing back at its device by [`DeviceId`]
//! - [`Topology`]: the registry of devices plus LLDP-learned links
//! - [`Finder`]: the read-only view of the topology handed to applications
//!
//! Every device carries its own port lock, so mutating one switch never
//! blocks lookups on another.

mod device;
mod port;
mod topology;

pub use device::{Device, DeviceId};
pub use port::Port;
pub use topology::{Endpoint, Finder, Topology};
