//! Error types for the library module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while listing or reading tracks.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Tracks directory could not be read.
    #[error("Failed to read tracks directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Track does not exist in the store.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Identifier does not name a file inside the tracks directory.
    #[error("Invalid track identifier: {0:?}")]
    InvalidTrack(String),

    /// Track could not be opened.
    #[error("Failed to open track {track}: {source}")]
    Open {
        track: String,
        #[source]
        source: std::io::Error,
    },

    /// Track could not be read.
    #[error("Failed to read track {track} at offset {offset}: {source}")]
    Read {
        track: String,
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}
