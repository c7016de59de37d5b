//! Content readers.
//!
//! A [`ContentReader`] is the single place a file's bytes come from. The
//! collection hands one to every entity it creates; each entity calls it at
//! most once.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::path::{canonicalize, AbsolutePath, CanonicalPath};

/// Reads the text of a file.
///
/// Implementations must report a missing file as [`Error::NotFound`] and a
/// directory as [`Error::NotAFile`]; everything else is passed through.
pub trait ContentReader: Send + Sync + fmt::Debug {
    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotAFile`, or any other I/O failure.
    fn read(&self, path: &AbsolutePath) -> Result<String>;
}

/// Reads from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskReader;

impl ContentReader for DiskReader {
    fn read(&self, path: &AbsolutePath) -> Result<String> {
        log::debug!("reading {path}");
        fs::read_to_string(path.as_path()).map_err(|e| Error::from_io(path.as_path(), e))
    }
}

/// An in-memory filesystem that counts the reads it serves.
///
/// Useful for virtual pipelines and for asserting that content is read
/// exactly once.
///
/// # Examples
///
/// ```
/// use pipewright::file::{ContentReader, MemoryReader};
/// use pipewright::path::AbsolutePath;
///
/// let reader = MemoryReader::new();
/// let path = AbsolutePath::new("/project/a.txt").unwrap();
/// reader.insert(&path, "hello");
///
/// assert_eq!(reader.read(&path).unwrap(), "hello");
/// assert_eq!(reader.reads(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryReader {
    files: RwLock<HashMap<CanonicalPath, String>>,
    reads: AtomicUsize,
}

impl MemoryReader {
    /// Create an empty in-memory filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `contents` at `path`, replacing any previous contents.
    pub fn insert(&self, path: &AbsolutePath, contents: impl Into<String>) {
        self.files.write().insert(canonicalize(path), contents.into());
    }

    /// How many reads have been served, including failed ones.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn is_directory(&self, path: &AbsolutePath) -> bool {
        let prefix = format!("{}/", canonicalize(path).as_str().trim_end_matches('/'));
        self.files.read().keys().any(|key| key.as_str().starts_with(&prefix))
    }
}

impl ContentReader for MemoryReader {
    fn read(&self, path: &AbsolutePath) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(contents) = self.files.read().get(&canonicalize(path)) {
            return Ok(contents.clone());
        }
        if self.is_directory(path) {
            return Err(Error::NotAFile {
                path: path.as_path().to_path_buf(),
            });
        }
        Err(Error::NotFound {
            path: path.as_path().to_path_buf(),
        })
    }
}
