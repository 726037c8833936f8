//! Playback state and engine snapshot types.

use serde::{Deserialize, Serialize};

/// Playback state of the broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing is read or broadcast.
    #[default]
    Paused,

    /// The broadcast loop reads one chunk per tick.
    Playing,
}

impl PlaybackState {
    /// Returns true if the broadcast loop is reading.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// The track currently being broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Track identifier.
    pub track: String,

    /// Bytes of the track already broadcast.
    pub offset: u64,
}

/// Counters accumulated by the broadcast loop since the engine started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastStats {
    /// Chunks read and fanned out.
    pub chunks_broadcast: u64,

    /// Bytes read and fanned out.
    pub bytes_broadcast: u64,

    /// Chunk deliveries skipped because the listener was congested.
    pub deliveries_skipped: u64,

    /// Listeners removed after a failed write.
    pub listeners_dropped: u64,

    /// Tracks played to the end.
    pub tracks_finished: u64,

    /// Tracks abandoned after an open or read failure.
    pub tracks_failed: u64,
}

/// Snapshot of the engine, returned by the status request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    pub state: PlaybackState,
    pub now_playing: Option<NowPlaying>,
    /// Tracks waiting in the playlist, in play order.
    pub queued: Vec<String>,
    pub listeners: usize,
    pub stats: BroadcastStats,
}
