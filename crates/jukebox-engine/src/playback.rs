//! Playback state and playlist.

use std::collections::VecDeque;

use jukebox_ipc::PlaybackState;
use tracing::debug;

/// Playback state machine and pending playlist. Performs no I/O.
#[derive(Debug, Default)]
pub struct Playback {
    state: PlaybackState,
    playlist: VecDeque<String>,
}

impl Playback {
    /// Create a paused playback with an empty playlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a track to the playlist.
    ///
    /// Starts playback when the playlist was empty while paused. Returns true
    /// if the state changed.
    pub fn enqueue(&mut self, track: String) -> bool {
        let starts = self.playlist.is_empty() && self.state == PlaybackState::Paused;
        if starts {
            self.state = PlaybackState::Playing;
        }

        debug!(track = %track, position = self.playlist.len(), starts, "Enqueued track");
        self.playlist.push_back(track);
        starts
    }

    /// Resume playback, whatever the playlist holds.
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback. The open track and the playlist are kept.
    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Get the current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Removes the next track to broadcast.
    pub fn next_track(&mut self) -> Option<String> {
        self.playlist.pop_front()
    }

    /// Pending tracks in play order.
    pub fn queued(&self) -> impl Iterator<Item = &str> {
        self.playlist.iter().map(String::as_str)
    }
}
