//! Commands sent from sessions to the engine.

use std::fmt;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::listener::{Listener, ListenerId};
use crate::state::EngineStatus;

/// Single-use reply slot for request/reply commands.
pub type Reply<T> = oneshot::Sender<T>;

/// The catalog could not be enumerated.
#[derive(Debug, Clone, Error)]
#[error("Catalog unavailable: {message}")]
pub struct CatalogUnavailable {
    pub message: String,
}

/// Commands that sessions can send to the engine.
pub enum EngineCommand {
    /// Append a track to the playlist.
    Enqueue { track: String },

    /// Resume playback.
    Play,

    /// Pause playback.
    Pause,

    /// Request the list of track identifiers in the catalog.
    ListCatalog {
        reply: Reply<Result<Vec<String>, CatalogUnavailable>>,
    },

    /// Start delivering broadcast chunks to a listener.
    RegisterListener(Box<dyn Listener>),

    /// Stop delivering broadcast chunks to a listener.
    UnregisterListener(ListenerId),

    /// Request a snapshot of the engine.
    GetStatus { reply: Reply<EngineStatus> },

    /// Stop the engine.
    Shutdown,
}

impl EngineCommand {
    /// Returns the bus topic name, for logging.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Enqueue { .. } => "enqueue",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::ListCatalog { .. } => "list-catalog",
            Self::RegisterListener(_) => "register-listener",
            Self::UnregisterListener(_) => "unregister-listener",
            Self::GetStatus { .. } => "get-status",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Debug for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enqueue { track } => f.debug_struct("Enqueue").field("track", track).finish(),
            Self::RegisterListener(listener) => f
                .debug_tuple("RegisterListener")
                .field(&listener.id())
                .finish(),
            Self::UnregisterListener(id) => f.debug_tuple("UnregisterListener").field(id).finish(),
            other => f.write_str(other.topic()),
        }
    }
}
