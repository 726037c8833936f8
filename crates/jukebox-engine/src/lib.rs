//! Core broadcast engine for the jukebox.
//!
//! The engine owns the playlist, the playback state, the active track cursor
//! and the listener set. It runs on a dedicated thread and is reached only
//! through the command bus defined in `jukebox-ipc`.

mod metrics;
mod orchestrator;
mod playback;
mod registry;

pub use metrics::BroadcastMetrics;
pub use orchestrator::{Engine, TickOutcome};
pub use playback::Playback;
pub use registry::{BroadcastOutcome, ListenerRegistry};

use std::time::Duration;

use crossbeam_channel::Receiver;
use jukebox_ipc::EngineCommand;
use jukebox_library::{Catalog, TrackStore};

/// Size of one broadcast chunk in bytes.
pub const CHUNK_SIZE: usize = 4096;

/// Period of the broadcast loop in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 100;

/// Interval between broadcast statistics log lines.
pub const STATS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Tunables of the broadcast loop.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time between two ticks.
    pub tick_interval: Duration,

    /// Maximum bytes read per tick.
    pub chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            chunk_size: CHUNK_SIZE,
        }
    }
}

/// Create an engine instance reading commands from `command_rx`.
pub fn create_engine(
    command_rx: Receiver<EngineCommand>,
    catalog: Box<dyn Catalog>,
    store: Box<dyn TrackStore>,
    config: EngineConfig,
) -> Engine {
    Engine::new(command_rx, catalog, store, config)
}
