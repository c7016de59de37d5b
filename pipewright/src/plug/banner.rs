//! Prepending and appending text.
//!
//! Both plugs emit a map whose single source is the input file, so a
//! combined map walks through to whatever the input itself maps to.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::file::{AddOptions, File, FileCollection};
use crate::source_map::SourceMap;
use crate::task::{Plug, Run};

/// Prepend text to every member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    text: String,
}

impl Banner {
    /// Prepend `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Plug for Banner {
    fn name(&self) -> &str {
        "banner"
    }

    async fn apply(&self, files: FileCollection, _run: &Run) -> Result<FileCollection> {
        decorate(&files, &self.text, "").await
    }
}

/// Append text to every member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    text: String,
}

impl Footer {
    /// Append `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Plug for Footer {
    fn name(&self) -> &str {
        "footer"
    }

    async fn apply(&self, files: FileCollection, _run: &Run) -> Result<FileCollection> {
        decorate(&files, "", &self.text).await
    }
}

async fn decorate(files: &FileCollection, prefix: &str, suffix: &str) -> Result<FileCollection> {
    let out = files.clone_view(None);
    for file in files.list() {
        let contents = file.contents().await?;
        let map = shifted_map(&file, &contents, prefix).await?;
        out.add(
            file.absolute_path().as_path(),
            AddOptions::contents(format!("{prefix}{contents}{suffix}"))
                .with_source_map(map)
                .with_original_path(file.original_path().clone()),
        )?;
    }
    Ok(out)
}

/// A map from `contents` placed after `prefix` back to `file`.
///
/// Every line start is mapped, plus every position the input's own map
/// mentions, so combining loses no precision.
async fn shifted_map(file: &File, contents: &Arc<str>, prefix: &str) -> Result<SourceMap> {
    let line_shift = u32::try_from(prefix.matches('\n').count()).unwrap_or(u32::MAX);
    let first_line_shift = prefix
        .rsplit('\n')
        .next()
        .map_or(0, |last| u32::try_from(last.len()).unwrap_or(u32::MAX));

    let mut positions: BTreeSet<(u32, u32)> = (0..contents.split('\n').count())
        .filter_map(|line| u32::try_from(line).ok())
        .map(|line| (line, 0))
        .collect();
    if let Some(own) = file.source_map().await? {
        let decoded = own.decode(file.absolute_path().as_path())?;
        positions.extend(
            decoded
                .tokens()
                .map(|token| (token.get_dst_line(), token.get_dst_col())),
        );
    }

    let source = file.absolute_path().to_string_lossy();
    let mut builder = ::sourcemap::SourceMapBuilder::new(file.absolute_path().file_name());
    for (line, col) in positions {
        let dst_col = if line == 0 { col + first_line_shift } else { col };
        builder.add(line + line_shift, dst_col, line, col, Some(source.as_str()), None, false);
    }

    SourceMap::from_encoded(
        &builder.into_sourcemap(),
        file.absolute_path().file_name().map(str::to_string),
        vec![Some(Arc::clone(contents))],
        vec![Some(file.clone())],
    )
}
