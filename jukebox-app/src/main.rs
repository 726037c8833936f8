//! Jukebox server entry point.
//!
//! Spawns the engine thread, then serves the control protocol and the HTTP
//! endpoints until Ctrl-C or a fatal server error.

mod config;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebox_engine::create_engine;
use jukebox_ipc::{command_channel, EngineHandle};
use jukebox_library::{DirectoryCatalog, FsTrackStore};
use jukebox_transport::{ControlServer, HttpServer, HttpState};

use crate::config::{Cli, JukeboxConfig};

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str =
    "jukebox=debug,jukebox_engine=debug,jukebox_library=debug,jukebox_transport=debug";

/// Initialize logging.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = JukeboxConfig::load(&cli)?;
    info!(?config, "Jukebox starting");

    let catalog =
        DirectoryCatalog::with_extension(&config.tracks_dir, config.track_extension.clone());
    let store = FsTrackStore::new(&config.tracks_dir);

    let (command_tx, command_rx) = command_channel();
    let engine = create_engine(
        command_rx,
        Box::new(catalog),
        Box::new(store.clone()),
        config.engine_config(),
    );
    let engine_thread = engine.spawn().context("failed to spawn engine thread")?;
    let handle = EngineHandle::new(command_tx);

    let control = ControlServer::bind(config.control_addr, handle.clone()).await?;
    let http = HttpServer::bind(
        config.http_addr,
        HttpState {
            engine: handle.clone(),
            store,
            listener_queue_chunks: config.listener_queue_chunks,
        },
    )
    .await?;

    let outcome = tokio::select! {
        _ = control.run() => Err(anyhow!("control server stopped")),
        result = http.run() => result.context("HTTP server failed"),
        result = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            result.context("failed to listen for Ctrl-C")
        }
    };

    if let Err(e) = &outcome {
        error!("{:#}", e);
    }

    // The engine may already be gone if its thread failed.
    let _ = handle.shutdown().await;
    tokio::task::spawn_blocking(move || engine_thread.join())
        .await
        .context("engine join task failed")?
        .map_err(|_| anyhow!("engine thread panicked"))?;
    info!("Jukebox stopped");

    outcome
}
