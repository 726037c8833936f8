//! Track catalog and track store.
//!
//! The catalog enumerates the track identifiers available in storage; the
//! track store opens one of them for chunked, offset-addressed reads. Both
//! are traits so the engine can be driven by in-memory doubles in tests.

mod catalog;
mod error;
mod track;

pub use catalog::{Catalog, DirectoryCatalog};
pub use error::LibraryError;
pub use track::{FsTrackStore, TrackSource, TrackStore};

/// Result type for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Default directory holding the tracks, relative to the working directory.
pub const DEFAULT_TRACKS_DIR: &str = "tracks";

/// Default file extension listed by the catalog.
pub const DEFAULT_TRACK_EXTENSION: &str = "mp3";
