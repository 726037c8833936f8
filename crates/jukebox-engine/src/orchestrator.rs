//! Main engine: command handling and the broadcast loop.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{select, Receiver};
use tracing::{debug, error, info, instrument, warn};

use jukebox_ipc::{
    CatalogUnavailable, EngineCommand, EngineStatus, NowPlaying, PlaybackState,
};
use jukebox_library::{Catalog, TrackSource, TrackStore};

use crate::metrics::BroadcastMetrics;
use crate::playback::Playback;
use crate::registry::{BroadcastOutcome, ListenerRegistry};
use crate::EngineConfig;

/// What a single tick of the broadcast loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Playback is paused; nothing was read.
    Paused,

    /// Nothing left to play; playback was paused.
    Idle,

    /// A chunk was read and fanned out.
    Broadcast {
        bytes: usize,
        outcome: BroadcastOutcome,
    },

    /// The active track ended; the cursor was released.
    EndOfTrack,

    /// The track could not be opened or read and was abandoned.
    TrackFailed,
}

/// The open track and the offset of the next chunk.
struct Cursor {
    track: String,
    source: Box<dyn TrackSource>,
    offset: u64,
}

/// The jukebox engine.
///
/// Every field is owned by the engine thread. Other threads reach it only
/// through [`EngineCommand`]s.
pub struct Engine {
    command_rx: Receiver<EngineCommand>,
    catalog: Box<dyn Catalog>,
    store: Box<dyn TrackStore>,
    config: EngineConfig,
    playback: Playback,
    cursor: Option<Cursor>,
    listeners: ListenerRegistry,
    metrics: BroadcastMetrics,
}

impl Engine {
    /// Create a new engine.
    pub fn new(
        command_rx: Receiver<EngineCommand>,
        catalog: Box<dyn Catalog>,
        store: Box<dyn TrackStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            command_rx,
            catalog,
            store,
            config,
            playback: Playback::new(),
            cursor: None,
            listeners: ListenerRegistry::new(),
            metrics: BroadcastMetrics::default(),
        }
    }

    /// Run the engine on a dedicated thread.
    pub fn spawn(mut self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("jukebox-engine".to_string())
            .spawn(move || self.run())
    }

    /// Run the engine (blocking) until shutdown or until every command
    /// sender is gone.
    ///
    /// Ticks and commands are handled one at a time, so a tick never starts
    /// before the previous tick's read and fan-out have completed. Ticks that
    /// fall due while a read is still running are coalesced into one.
    #[instrument(
        name = "engine_run",
        skip(self),
        fields(tick_ms = self.config.tick_interval.as_millis() as u64)
    )]
    pub fn run(&mut self) {
        info!("Engine starting");

        let command_rx = self.command_rx.clone();
        let ticker = crossbeam_channel::tick(self.config.tick_interval);

        loop {
            select! {
                recv(command_rx) -> command => match command {
                    Ok(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    Err(_) => {
                        info!("Command channel disconnected, shutting down");
                        break;
                    }
                },
                recv(ticker) -> _ => {
                    self.tick();
                    self.report_stats();
                }
            }
        }

        info!("Engine stopped");
    }

    /// Handle a command. Returns false if the engine should stop.
    fn handle_command(&mut self, command: EngineCommand) -> bool {
        debug!(?command, "Handling command");

        match command {
            EngineCommand::Enqueue { track } => {
                if self.playback.enqueue(track) {
                    info!("Playback started by schedule");
                }
            }
            EngineCommand::Play => self.playback.play(),
            EngineCommand::Pause => self.playback.pause(),
            EngineCommand::ListCatalog { reply } => {
                let result = self.catalog.list().map_err(|e| {
                    warn!("Catalog listing failed: {}", e);
                    CatalogUnavailable {
                        message: e.to_string(),
                    }
                });
                if reply.send(result).is_err() {
                    debug!("Catalog requester went away before the reply");
                }
            }
            EngineCommand::RegisterListener(listener) => self.listeners.register(listener),
            EngineCommand::UnregisterListener(id) => {
                self.listeners.unregister(id);
            }
            EngineCommand::GetStatus { reply } => {
                if reply.send(self.status()).is_err() {
                    debug!("Status requester went away before the reply");
                }
            }
            EngineCommand::Shutdown => {
                info!("Shutdown requested");
                return false;
            }
        }

        true
    }

    /// Advance the broadcast by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.playback.state().is_playing() {
            return TickOutcome::Paused;
        }

        if self.cursor.is_none() {
            let Some(track) = self.playback.next_track() else {
                info!("Playlist exhausted, pausing");
                self.playback.pause();
                return TickOutcome::Idle;
            };

            match self.store.open(&track) {
                Ok(source) => {
                    info!(track = %track, "Now playing");
                    self.cursor = Some(Cursor {
                        track,
                        source,
                        offset: 0,
                    });
                }
                Err(e) => {
                    error!(track = %track, "Failed to open track, skipping: {}", e);
                    self.metrics.record_track_failed();
                    return TickOutcome::TrackFailed;
                }
            }
        }

        let Some(cursor) = self.cursor.as_mut() else {
            return TickOutcome::Idle;
        };

        match cursor.source.read_chunk(cursor.offset, self.config.chunk_size) {
            Ok(chunk) if chunk.is_empty() => {
                info!(track = %cursor.track, bytes = cursor.offset, "Track finished");
                self.cursor = None;
                self.metrics.record_track_finished();
                TickOutcome::EndOfTrack
            }
            Ok(chunk) => {
                cursor.offset += chunk.len() as u64;
                let outcome = self.listeners.broadcast(&chunk);
                self.metrics.record_broadcast(chunk.len(), outcome);
                TickOutcome::Broadcast {
                    bytes: chunk.len(),
                    outcome,
                }
            }
            Err(e) => {
                error!(track = %cursor.track, "Read failed, skipping track: {}", e);
                self.cursor = None;
                self.metrics.record_track_failed();
                TickOutcome::TrackFailed
            }
        }
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Snapshot of the engine.
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.playback.state(),
            now_playing: self.cursor.as_ref().map(|cursor| NowPlaying {
                track: cursor.track.clone(),
                offset: cursor.offset,
            }),
            queued: self.playback.queued().map(str::to_string).collect(),
            listeners: self.listeners.len(),
            stats: self.metrics.snapshot(),
        }
    }

    fn report_stats(&mut self) {
        let now = Instant::now();
        if !self.playback.state().is_playing() || !self.metrics.report_due(now) {
            return;
        }

        let stats = self.metrics.snapshot();
        info!(
            chunks = stats.chunks_broadcast,
            bytes = stats.bytes_broadcast,
            skipped = stats.deliveries_skipped,
            dropped = stats.listeners_dropped,
            listeners = self.listeners.len(),
            uptime_secs = self.metrics.uptime().as_secs(),
            "Broadcast stats"
        );
        self.metrics.mark_reported(now);
    }
}
