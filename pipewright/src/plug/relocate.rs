//! Moving a collection to another directory.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::file::FileCollection;
use crate::path::{relativize, resolve, DirectoryPath};
use crate::task::{Plug, Run};

/// Re-root the collection at another directory.
///
/// Members keep their position relative to the root. The cache moves with
/// them, so files reached through a relocated member's source map are still
/// found without another read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocate {
    to: PathBuf,
}

impl Relocate {
    /// Relocate to `to`, relative to the working directory.
    #[must_use]
    pub fn new(to: impl Into<PathBuf>) -> Self {
        Self { to: to.into() }
    }
}

#[async_trait]
impl Plug for Relocate {
    fn name(&self) -> &str {
        "relocate"
    }

    async fn apply(&self, files: FileCollection, run: &Run) -> Result<FileCollection> {
        let to = DirectoryPath::from(resolve(run.working_dir(), &self.to)?);
        let out = files.clone_view(Some(to.clone()));
        for file in files.list() {
            let relative = relativize(files.root(), file.absolute_path());
            let moved = resolve(&to, relative.as_path())?;
            let entity = out.get_absolute(&moved);
            out.add_file(moved.as_path(), &entity)?;
        }
        Ok(out)
    }
}
