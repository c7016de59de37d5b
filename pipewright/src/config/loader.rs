//! Build file discovery and loading.
//!
//! This module finds the build file for a working directory and follows its
//! `extends` chain.

use crate::config::schema::{BuildConfig, DEFAULT_BUILD_FILE};
use crate::error::{Error, Result};
use crate::path::normalize::normalize;
use std::fs;
use std::path::{Path, PathBuf};

/// One build file of an `extends` chain.
///
/// # Examples
///
/// ```
/// use pipewright::config::ConfigSource;
/// use std::path::PathBuf;
///
/// let source = ConfigSource {
///     path: PathBuf::from("/project/pipewright.yaml"),
///     config: Default::default(),
/// };
/// assert!(source.config.tasks.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the build file.
    pub path: PathBuf,
    /// Parsed build file.
    pub config: BuildConfig,
}

/// Loads build files.
///
/// # Examples
///
/// ```no_run
/// use pipewright::config::ConfigLoader;
/// use std::path::Path;
///
/// let file = ConfigLoader::find(Path::new(".")).unwrap();
/// let chain = ConfigLoader::load_chain(&file).unwrap();
/// println!("{} build file(s)", chain.len());
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Find the nearest build file, walking up from `start_dir`.
    #[must_use]
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let candidate = current.join(DEFAULT_BUILD_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load `path` and every file it extends, most distant ancestor first.
    ///
    /// `extends` is resolved relative to the directory of the file that
    /// declares it.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or `ConfigCycle`
    /// if the chain revisits a file.
    pub fn load_chain(path: &Path) -> Result<Vec<ConfigSource>> {
        let mut chain: Vec<PathBuf> = Vec::new();
        let mut sources = Vec::new();
        let mut next = Some(normalize(path)?.into_path_buf());

        while let Some(path) = next.take() {
            if chain.contains(&path) {
                chain.push(path);
                return Err(Error::ConfigCycle { chain });
            }
            chain.push(path.clone());

            let config = Self::load_file(&path)?;
            if let Some(extends) = &config.extends {
                let dir = path.parent().unwrap_or_else(|| Path::new("/"));
                next = Some(normalize(&dir.join(extends))?.into_path_buf());
            }
            sources.push(ConfigSource { path, config });
        }

        sources.reverse();
        Ok(sources)
    }

    /// Load and parse a YAML build file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file is missing, or an error if it cannot
    /// be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<BuildConfig> {
        let contents = fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;

        serde_yaml::from_str(&contents).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Invalid YAML: {e}"),
        })
    }
}
