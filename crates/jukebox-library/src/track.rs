//! Track store and chunked track reads.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::error::LibraryError;
use crate::LibraryResult;

/// Opens tracks by identifier.
pub trait TrackStore: Send {
    fn open(&self, track: &str) -> LibraryResult<Box<dyn TrackSource>>;
}

/// An open track supporting offset-addressed reads.
pub trait TrackSource: Send {
    /// Reads up to `max_len` bytes starting at `offset`.
    ///
    /// Returns fewer than `max_len` bytes only at the end of the track, and an
    /// empty buffer once `offset` is at or past the end.
    fn read_chunk(&mut self, offset: u64, max_len: usize) -> LibraryResult<Bytes>;
}

/// Track store backed by files in a directory.
#[derive(Debug, Clone)]
pub struct FsTrackStore {
    dir: PathBuf,
}

impl FsTrackStore {
    /// Create a store reading tracks from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Maps a track identifier to its path inside the tracks directory.
    ///
    /// The identifier must be a single plain file name.
    pub fn resolve(&self, track: &str) -> LibraryResult<PathBuf> {
        let mut components = Path::new(track).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.dir.join(name)),
            _ => Err(LibraryError::InvalidTrack(track.to_string())),
        }
    }
}

impl TrackStore for FsTrackStore {
    fn open(&self, track: &str) -> LibraryResult<Box<dyn TrackSource>> {
        let path = self.resolve(track)?;
        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LibraryError::TrackNotFound(track.to_string()),
            _ => LibraryError::Open {
                track: track.to_string(),
                source,
            },
        })?;

        debug!(track, path = %path.display(), "Opened track");
        Ok(Box::new(FileTrack {
            track: track.to_string(),
            file,
        }))
    }
}

struct FileTrack {
    track: String,
    file: File,
}

impl FileTrack {
    fn read_at(&mut self, offset: u64, max_len: usize) -> io::Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = Vec::with_capacity(max_len);
        (&mut self.file).take(max_len as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl TrackSource for FileTrack {
    fn read_chunk(&mut self, offset: u64, max_len: usize) -> LibraryResult<Bytes> {
        self.read_at(offset, max_len)
            .map(Bytes::from)
            .map_err(|source| LibraryError::Read {
                track: self.track.clone(),
                offset,
                source,
            })
    }
}
