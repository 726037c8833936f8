//! Typed command bus for the jukebox.
//!
//! This crate defines the messages exchanged between the network-facing
//! sessions (control protocol, stream intake, HTTP) and the engine, which
//! owns the playlist, playback state, track cursor and listener set.

mod commands;
mod handle;
mod listener;
mod state;

pub use commands::{CatalogUnavailable, EngineCommand, Reply};
pub use handle::{BusError, EngineHandle};
pub use listener::{Listener, ListenerError, ListenerId};
pub use state::{BroadcastStats, EngineStatus, NowPlaying, PlaybackState};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (sessions → engine).
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<EngineCommand>, Receiver<EngineCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}
