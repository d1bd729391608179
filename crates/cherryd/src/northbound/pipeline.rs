use super::{Processor, Propagation};
use crate::error::{ControllerError, Result};
use cherry_network::{Device, Finder, Port};
use cherry_protocol::Ethernet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Ordered chain of processors. The order is fixed once the controller starts.
#[derive(Default, Clone)]
pub struct Pipeline {
    processors: Vec<Arc<dyn Processor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a processor to the end of the chain.
    pub fn with(mut self, processor: impl Processor + 'static) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    pub fn push(&mut self, processor: Arc<dyn Processor>) {
        self.processors.push(processor);
    }

    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub async fn on_packet_in(
        &self,
        finder: &dyn Finder,
        ingress: &Port,
        eth: &Ethernet,
    ) -> Result<Propagation> {
        for p in &self.processors {
            let result = p.on_packet_in(finder, ingress, eth).await;
            if settle(p.as_ref(), "packet_in", result)? == Propagation::Stop {
                return Ok(Propagation::Stop);
            }
        }
        Ok(Propagation::Continue)
    }

    pub async fn on_device_up(
        &self,
        finder: &dyn Finder,
        device: &Arc<Device>,
    ) -> Result<Propagation> {
        for p in &self.processors {
            let result = p.on_device_up(finder, device).await;
            if settle(p.as_ref(), "device_up", result)? == Propagation::Stop {
                return Ok(Propagation::Stop);
            }
        }
        Ok(Propagation::Continue)
    }

    pub async fn on_device_down(
        &self,
        finder: &dyn Finder,
        device: &Arc<Device>,
    ) -> Result<Propagation> {
        for p in &self.processors {
            let result = p.on_device_down(finder, device).await;
            if settle(p.as_ref(), "device_down", result)? == Propagation::Stop {
                return Ok(Propagation::Stop);
            }
        }
        Ok(Propagation::Continue)
    }

    pub async fn on_port_updated(&self, finder: &dyn Finder, port: &Port) -> Result<Propagation> {
        for p in &self.processors {
            let result = p.on_port_updated(finder, port).await;
            if settle(p.as_ref(), "port_updated", result)? == Propagation::Stop {
                return Ok(Propagation::Stop);
            }
        }
        Ok(Propagation::Continue)
    }
}

fn settle(
    processor: &dyn Processor,
    event: &'static str,
    result: Result<Propagation>,
) -> Result<Propagation> {
    match result {
        Ok(Propagation::Stop) => {
            debug!(processor = processor.name(), event, "event consumed");
            Ok(Propagation::Stop)
        }
        Ok(Propagation::Continue) => Ok(Propagation::Continue),
        Err(e) => Err(ControllerError::application(processor.name(), e)),
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
