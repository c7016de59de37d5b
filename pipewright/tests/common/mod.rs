//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pipewright::file::{FileCollection, MemoryReader};
use pipewright::path::{AbsolutePath, DirectoryPath};
use tempfile::TempDir;

/// An absolute path.
pub fn abs(path: &str) -> AbsolutePath {
    AbsolutePath::new(path).unwrap()
}

/// A directory path.
pub fn dir(path: &str) -> DirectoryPath {
    DirectoryPath::new(path).unwrap()
}

/// A collection over an in-memory filesystem seeded with `files`.
pub fn memory_collection(root: &str, files: &[(&str, &str)]) -> (FileCollection, Arc<MemoryReader>) {
    let reader = Arc::new(MemoryReader::new());
    for (path, contents) in files {
        reader.insert(&abs(path), *contents);
    }
    let collection = FileCollection::with_reader(dir(root), reader.clone());
    (collection, reader)
}

/// A temporary project directory.
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// An empty workspace.
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The workspace directory as a [`DirectoryPath`].
    pub fn root(&self) -> DirectoryPath {
        DirectoryPath::new(self.path()).unwrap()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Read a file of the workspace.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative)).unwrap()
    }
}
