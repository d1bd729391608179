//! Per-switch sessions.
//!
//! A [`Session`] owns one switch connection. Protocol messages go through
//! the [`Of13Controller`] state machine first; the session then registers the
//! switch in the topology and turns what the switch reports into northbound
//! pipeline events.

mod connection;
mod handler;
mod of13;
mod profile;

pub use connection::Session;
pub use handler::MessageHandler;
pub use of13::{HandshakeStep, Of13Controller, HANDSHAKE_SEQUENCE, TABLE_MISS_COOKIE};
pub use profile::SwitchProfile;

use crate::config::OpenflowConfig;

/// Protocol parameters applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Sent in SET_CONFIG.
    pub miss_send_len: u16,
    /// TTL of discovery LLDP frames.
    pub lldp_ttl_secs: u16,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&OpenflowConfig::default())
    }
}

impl From<&OpenflowConfig> for SessionSettings {
    fn from(config: &OpenflowConfig) -> Self {
        Self {
            miss_send_len: config.miss_send_len,
            lldp_ttl_secs: config.lldp_ttl_secs,
        }
    }
}
