//! Cherry OpenFlow controller core.
//!
//! - [`session`]: per-switch handshake state machine and event normalization
//! - [`northbound`]: ordered application pipeline and the bundled apps
//! - [`directory`]: trusted IP to MAC bindings used by proxy ARP
//! - [`config`]: TOML configuration
//!
//! # Architecture
//!
//! 1. A transport accepts a switch connection and opens a [`Session`]
//!    through the [`Controller`]
//! 2. HELLO triggers the handshake; FEATURES_REPLY registers the device in
//!    the shared [`cherry_network::Topology`]
//! 3. DESCRIPTION_REPLY installs table-miss entries for the switch's
//!    [`session::SwitchProfile`]
//! 4. PORT_DESCRIPTION_REPLY populates ports and fires device-up
//! 5. PACKET_IN and PORT_STATUS become pipeline events
//! 6. When the connection ends the device is removed and device-down fires

pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod northbound;
pub mod session;

pub use config::ControllerConfig;
pub use controller::Controller;
pub use directory::{Directory, DirectoryError, StaticDirectory};
pub use error::{ControllerError, Result};
pub use northbound::{Pipeline, Processor, Propagation};
pub use session::{Session, SessionSettings};
