//! Northbound event pipeline.
//!
//! Network events normalized by a session are handed to an ordered chain of
//! [`Processor`]s. Each processor either lets the event continue down the
//! chain or stops it; every event method defaults to continuing, so an
//! application only overrides the events it cares about.

pub mod app;
mod pipeline;

pub use pipeline::Pipeline;

use crate::error::Result;
use async_trait::async_trait;
use cherry_network::{Device, Finder, Port};
use cherry_protocol::Ethernet;
use std::sync::Arc;

/// Outcome of a processor handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Hand the event to the next processor.
    Continue,
    /// Consume the event; later processors never see it.
    Stop,
}

/// One stage of the northbound pipeline.
///
/// Processors must not assume they are first or last in the chain. An error
/// aborts propagation of that event only.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Returns the name of this processor (for logging and error context).
    fn name(&self) -> &str;

    /// A frame arrived from a switch port.
    async fn on_packet_in(
        &self,
        _finder: &dyn Finder,
        _ingress: &Port,
        _eth: &Ethernet,
    ) -> Result<Propagation> {
        Ok(Propagation::Continue)
    }

    /// A switch finished its handshake and reported its ports.
    async fn on_device_up(
        &self,
        _finder: &dyn Finder,
        _device: &Arc<Device>,
    ) -> Result<Propagation> {
        Ok(Propagation::Continue)
    }

    /// A switch connection closed. The device is no longer in the finder.
    async fn on_device_down(
        &self,
        _finder: &dyn Finder,
        _device: &Arc<Device>,
    ) -> Result<Propagation> {
        Ok(Propagation::Continue)
    }

    /// A port changed state.
    async fn on_port_updated(&self, _finder: &dyn Finder, _port: &Port) -> Result<Propagation> {
        Ok(Propagation::Continue)
    }
}
