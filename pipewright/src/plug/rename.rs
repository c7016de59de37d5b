//! Changing file extensions.

use async_trait::async_trait;

use crate::error::Result;
use crate::file::FileCollection;
use crate::task::{Plug, Run};

/// Give every member a new extension.
///
/// Renamed members are wrappers around the originals: nothing is re-read
/// and the source map carries over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    extension: String,
}

impl Rename {
    /// Rename to `extension`, with or without the leading dot.
    #[must_use]
    pub fn new(extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }
}

#[async_trait]
impl Plug for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    async fn apply(&self, files: FileCollection, _run: &Run) -> Result<FileCollection> {
        let out = files.clone_view(None);
        for file in files.list() {
            let renamed = file.absolute_path().with_extension(&self.extension);
            out.add_file(renamed.as_path(), &file)?;
        }
        Ok(out)
    }
}
