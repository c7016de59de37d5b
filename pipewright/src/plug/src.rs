//! File discovery and the `Src` pipeline source.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};
use crate::file::{AddOptions, FileCollection};
use crate::path::{
    case_sensitivity, relativize, resolve, AbsolutePath, CaseSensitivity, DirectoryPath,
    RelativePath,
};
use crate::task::{Run, Source};

/// Directories skipped unless a pattern is discovered with
/// [`DiscoverOptions::exclude_dependencies`] turned off.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", "target", ".git"];

/// Options for [`discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// Case sensitivity of matching; the process policy when unset.
    pub case_sensitive: Option<bool>,
    /// Deepest number of path components a result may have.
    pub max_depth: Option<usize>,
    /// Whether symlinked files are returned.
    pub follow_symlinks: bool,
    /// Skip [`DEFAULT_EXCLUDES`].
    pub exclude_dependencies: bool,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            case_sensitive: None,
            max_depth: None,
            follow_symlinks: true,
            exclude_dependencies: true,
        }
    }
}

/// Find the files below `root` matching `patterns`.
///
/// Patterns are relative to `root`; a leading `!` turns a pattern into an
/// exclusion. Results are relative to `root`, sorted and unique.
///
/// # Errors
///
/// Returns `Glob` for a pattern that does not parse.
///
/// # Examples
///
/// ```
/// use pipewright::path::DirectoryPath;
/// use pipewright::plug::{discover, DiscoverOptions};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir(dir.path().join("src")).unwrap();
/// std::fs::write(dir.path().join("src/a.js"), "").unwrap();
/// std::fs::write(dir.path().join("src/a.test.js"), "").unwrap();
///
/// let root = DirectoryPath::new(dir.path()).unwrap();
/// let patterns = ["src/**/*.js".to_string(), "!**/*.test.js".to_string()];
/// let found = discover(&root, &patterns, &DiscoverOptions::default()).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].to_slash_string(), "src/a.js");
/// ```
pub fn discover(
    root: &DirectoryPath,
    patterns: &[String],
    options: &DiscoverOptions,
) -> Result<Vec<RelativePath>> {
    let case_sensitive = options
        .case_sensitive
        .unwrap_or(case_sensitivity() == CaseSensitivity::Sensitive);
    let match_options = MatchOptions {
        case_sensitive,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let (excludes, includes): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| p.starts_with('!'));
    let excludes = excludes
        .into_iter()
        .map(|p| compile(&p[1..]))
        .collect::<Result<Vec<_>>>()?;

    let escaped_root = Pattern::escape(&root.as_path().to_string_lossy());
    let mut found = BTreeSet::new();
    for include in includes {
        compile(include)?;
        let full = format!("{}/{}", escaped_root.trim_end_matches('/'), include);
        let entries = glob::glob_with(&full, match_options).map_err(|e| Error::Glob {
            pattern: include.clone(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("skipping unreadable path: {e}");
                    continue;
                }
            };
            if let Some(relative) = accept(root, &path, &excludes, match_options, options) {
                found.insert(relative);
            }
        }
    }

    log::debug!("discovered {} file(s) below {root}", found.len());
    found
        .into_iter()
        .map(RelativePath::new)
        .collect()
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| Error::Glob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// The slash-separated path of `path` below `root`, if it should be kept.
fn accept(
    root: &DirectoryPath,
    path: &Path,
    excludes: &[Pattern],
    match_options: MatchOptions,
    options: &DiscoverOptions,
) -> Option<String> {
    let metadata = if options.follow_symlinks {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    };
    if !metadata.ok()?.is_file() {
        return None;
    }

    let absolute = AbsolutePath::new(path).ok()?;
    let relative = relativize(root, &absolute).to_slash_string();
    let parts: Vec<&str> = relative.split('/').collect();

    if parts.first() == Some(&"..") {
        return None;
    }
    if options.max_depth.is_some_and(|depth| parts.len() > depth) {
        return None;
    }
    if options.exclude_dependencies
        && parts.iter().any(|part| DEFAULT_EXCLUDES.contains(part))
    {
        return None;
    }
    if excludes
        .iter()
        .any(|exclude| exclude.matches_with(&relative, match_options))
    {
        return None;
    }
    Some(relative)
}

/// A pipeline source that discovers files below a base directory.
///
/// The collection it produces is rooted at the base and forks the run's
/// file cache, so tasks that read the same files share one read.
#[derive(Debug, Clone)]
pub struct Src {
    patterns: Vec<String>,
    base: Option<PathBuf>,
    options: DiscoverOptions,
}

impl Src {
    /// Discover `patterns` below the working directory.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            base: None,
            options: DiscoverOptions::default(),
        }
    }

    /// Discover below `base`, relative to the working directory.
    #[must_use]
    pub fn base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Replace the discovery options.
    #[must_use]
    pub fn options(mut self, options: DiscoverOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl Source for Src {
    async fn load(&self, run: &Run) -> Result<FileCollection> {
        let base = match &self.base {
            Some(base) => DirectoryPath::from(resolve(run.working_dir(), base)?),
            None => run.working_dir().clone(),
        };

        let root = base.clone();
        let patterns = self.patterns.clone();
        let options = self.options.clone();
        let found = tokio::task::spawn_blocking(move || discover(&root, &patterns, &options))
            .await
            .map_err(|e| Error::Join(e.to_string()))??;

        let files = run.files().fork_at(base);
        for relative in found {
            files.add(relative.as_path(), AddOptions::default())?;
        }
        Ok(files)
    }
}
