//! Process-wide controller handle.

use crate::error::Result;
use crate::northbound::Pipeline;
use crate::session::{Session, SessionSettings};
use cherry_network::Topology;
use cherry_openflow::{Factory, Incoming, Writer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Shared state every switch session runs against.
///
/// Transport integrations call [`Controller::spawn_session`] for each
/// accepted connection and feed decoded messages into the returned channel.
#[derive(Debug, Clone)]
pub struct Controller {
    topology: Arc<Topology>,
    pipeline: Arc<Pipeline>,
    settings: SessionSettings,
    shutdown: CancellationToken,
}

impl Controller {
    pub fn new(topology: Arc<Topology>, pipeline: Pipeline, settings: SessionSettings) -> Self {
        Self {
            topology,
            pipeline: Arc::new(pipeline),
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Creates a session for a new connection. Cancelled by [`Controller::shutdown`].
    pub fn open_session(&self, factory: Arc<dyn Factory>, writer: Arc<dyn Writer>) -> Session {
        Session::new(
            factory,
            writer,
            self.topology.clone(),
            self.pipeline.clone(),
            self.settings,
            self.shutdown.child_token(),
        )
    }

    /// Opens a session and runs it on its own task.
    pub fn spawn_session(
        &self,
        factory: Arc<dyn Factory>,
        writer: Arc<dyn Writer>,
        messages: mpsc::Receiver<Incoming>,
    ) -> JoinHandle<Result<()>> {
        let session = self.open_session(factory, writer);
        tokio::spawn(session.run(messages))
    }

    /// Stops every session opened by this controller.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
