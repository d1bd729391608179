//! Cherry OpenFlow controller daemon.
//!
//! Loads the configuration, assembles the northbound pipeline and keeps the
//! controller alive until interrupted.

use anyhow::Context;
use cherry_network::Topology;
use cherryd::northbound::app::ProxyArp;
use cherryd::{Controller, ControllerConfig, Pipeline, SessionSettings};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Cherry OpenFlow controller
#[derive(Parser, Debug)]
#[command(name = "cherryd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (built-in defaults when omitted)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ControllerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ControllerConfig::default(),
    };
    let source = args
        .config
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    if args.check {
        println!("{}: configuration OK", source);
        return Ok(());
    }

    init_logging(&config.log.level);
    info!(config = %source, "cherryd: starting");

    let directory = Arc::new(config.directory());
    info!(hosts = directory.len(), "cherryd: static host directory loaded");

    let announcement = config.proxyarp.announcement();
    if announcement.is_none() {
        warn!("cherryd: no proxyarp announcement configured; switches will not be announced");
    }
    let pipeline = Pipeline::new().with(ProxyArp::new(directory).with_announcement(announcement));
    info!(processors = ?pipeline.names(), "cherryd: northbound pipeline ready");

    let controller = Controller::new(
        Arc::new(Topology::new()),
        pipeline,
        SessionSettings::from(&config.openflow),
    );

    signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("cherryd: shutting down");
    controller.shutdown();

    Ok(())
}

/// Initialize structured logging. RUST_LOG overrides the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
