//! Writing collections to disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::file::{File, FileCollection};
use crate::path::{relativize, resolve, AbsolutePath, DirectoryPath};
use crate::source_map::{append_source_map_comment, ProduceOptions};
use crate::task::{Plug, Run};

/// Where a written file's source map goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapOutput {
    /// A `<file>.map` next to the file.
    #[default]
    Sibling,
    /// A base64 data URL in the reference comment.
    Inline,
    /// No map and no comment.
    None,
}

impl std::str::FromStr for SourceMapOutput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sibling" => Ok(Self::Sibling),
            "inline" => Ok(Self::Inline),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "invalid source map output '{s}', expected sibling, inline or none"
            )),
        }
    }
}

/// Write every member below a destination directory.
///
/// Each member keeps its position relative to the collection root. The
/// returned collection is rooted at the destination and its members share
/// the written files' content, source maps included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dest {
    dir: PathBuf,
    source_maps: SourceMapOutput,
    produce: ProduceOptions,
}

impl Dest {
    /// Write below `dir`, relative to the working directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            source_maps: SourceMapOutput::default(),
            produce: ProduceOptions::default(),
        }
    }

    /// Choose where source maps go.
    #[must_use]
    pub fn source_maps(mut self, output: SourceMapOutput) -> Self {
        self.source_maps = output;
        self
    }

    /// Choose how source maps are produced.
    #[must_use]
    pub fn produce(mut self, options: ProduceOptions) -> Self {
        self.produce = options;
        self
    }

    async fn write(&self, file: &File, target: &AbsolutePath) -> Result<()> {
        let contents = file.contents().await?;
        let map = match self.source_maps {
            SourceMapOutput::None => None,
            _ => file.produce_source_map(target.clone(), self.produce).await?,
        };

        let text = match (map, self.source_maps) {
            (Some(map), SourceMapOutput::Inline) => {
                append_source_map_comment(&contents, &map.to_data_url()?)
            }
            (Some(map), SourceMapOutput::Sibling) => {
                let map_path = target.with_suffix(".map");
                write_file(map_path.as_path(), map.to_json()?.as_bytes()).await?;
                let url = map_path.file_name().unwrap_or_default();
                append_source_map_comment(&contents, url)
            }
            _ => contents.to_string(),
        };

        write_file(target.as_path(), text.as_bytes()).await
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::from_io(dir, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| Error::from_io(path, e))
}

#[async_trait]
impl Plug for Dest {
    fn name(&self) -> &str {
        "dest"
    }

    async fn apply(&self, files: FileCollection, run: &Run) -> Result<FileCollection> {
        let dest = DirectoryPath::from(resolve(run.working_dir(), &self.dir)?);
        let written = run.files().fork_at(dest.clone());

        for file in files.list() {
            let relative = relativize(files.root(), file.absolute_path());
            let target = resolve(&dest, relative.as_path())?;
            self.write(&file, &target).await?;
            log::debug!("wrote {target}");
            written.add_file(target.as_path(), &file)?;
        }

        log::info!("wrote {} file(s) to {dest}", written.len());
        Ok(written)
    }
}
