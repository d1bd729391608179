//! Error types for cherryd

use crate::directory::DirectoryError;
use cherry_network::DeviceId;
use cherry_openflow::OpenflowError;
use cherry_protocol::PacketError;
use thiserror::Error;

/// Errors raised while driving a switch session or a northbound application.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A handshake step could not be built or written.
    #[error("failed to send {step}: {source}")]
    Send {
        step: &'static str,
        source: OpenflowError,
    },

    #[error("failed to set table_miss flow entry on table {table_id}: {source}")]
    TableMiss { table_id: u8, source: OpenflowError },

    /// Frame carried by a PACKET_IN could not be decoded.
    #[error("failed to decode packet: {0}")]
    Decode(#[from] PacketError),

    #[error("host directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    /// Message construction or transmission failed outside the handshake.
    #[error("OpenFlow error: {0}")]
    Openflow(#[from] OpenflowError),

    /// A northbound application failed while handling an event.
    #[error("{name}: {source}")]
    Application {
        name: String,
        source: Box<ControllerError>,
    },

    #[error("device {0} is not registered")]
    DeviceNotRegistered(DeviceId),

    /// The switch sent a message that needs a registered device before its
    /// FEATURES_REPLY.
    #[error("{0} received before FEATURES_REPLY")]
    OutOfOrder(&'static str),

    #[error("session cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl ControllerError {
    pub fn application(name: impl Into<String>, source: ControllerError) -> Self {
        ControllerError::Application {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error ends the session it occurred in.
    ///
    /// Handshake and table-miss failures leave the switch in an unknown
    /// state. Everything else is per-event: the caller logs it and keeps
    /// reading.
    pub fn is_fatal(&self) -> bool {
        match self {
            ControllerError::Send { .. }
            | ControllerError::TableMiss { .. }
            | ControllerError::OutOfOrder(_)
            | ControllerError::Cancelled => true,
            ControllerError::Openflow(e) => matches!(
                e,
                OpenflowError::ConnectionClosed | OpenflowError::Io(_)
            ),
            ControllerError::Decode(_)
            | ControllerError::Directory(_)
            | ControllerError::Application { .. }
            | ControllerError::DeviceNotRegistered(_)
            | ControllerError::Config(_) => false,
        }
    }
}

/// Result type alias for cherryd operations
pub type Result<T> = std::result::Result<T, ControllerError>;
