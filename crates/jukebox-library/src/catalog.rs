//! Catalog enumeration.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::LibraryError;
use crate::{LibraryResult, DEFAULT_TRACK_EXTENSION};

/// Source of the track identifiers available for scheduling.
pub trait Catalog: Send {
    /// Lists track identifiers in enumeration order.
    fn list(&self) -> LibraryResult<Vec<String>>;
}

/// Catalog backed by the regular files of one directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
    extension: String,
}

impl DirectoryCatalog {
    /// Create a catalog listing `*.mp3` files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_extension(dir, DEFAULT_TRACK_EXTENSION)
    }

    /// Create a catalog listing files with the given extension (without dot).
    pub fn with_extension(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }
}

impl Catalog for DirectoryCatalog {
    fn list(&self) -> LibraryResult<Vec<String>> {
        let read_dir_error = |source| LibraryError::ReadDir {
            path: self.dir.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            if !entry.file_type().map_err(read_dir_error)?.is_file() {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                trace!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };

            if self.matches(&name) {
                names.push(name);
            }
        }

        names.sort();
        debug!(dir = %self.dir.display(), count = names.len(), "Listed catalog");
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_lists_only_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.mp3");
        touch(dir.path(), "a.mp3");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "mp3");
        fs::create_dir(dir.path().join("folder.mp3")).unwrap();

        let catalog = DirectoryCatalog::new(dir.path());
        assert_eq!(catalog.list().unwrap(), vec!["a.mp3", "b.mp3"]);
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        touch(dir.path(), "b.ogg");

        let catalog = DirectoryCatalog::with_extension(dir.path(), ".ogg");
        assert_eq!(catalog.list().unwrap(), vec!["b.ogg"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new(dir.path());
        assert!(catalog.list().unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new(dir.path().join("missing"));
        assert!(matches!(
            catalog.list(),
            Err(LibraryError::ReadDir { .. })
        ));
    }
}
