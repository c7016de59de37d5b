//! Utility functions for CLI operations.
//!
//! This module provides path resolution and project loading shared by the
//! commands.

use crate::error::CliError;
use pipewright::config::ConfigBuilder;
use pipewright::path::{normalize::normalize, DirectoryPath};
use pipewright::Project;
use std::env;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Build file override.
    pub file: Option<PathBuf>,

    /// Working directory override.
    pub cwd: Option<PathBuf>,
}

/// Resolve the working directory, using the process CWD if not specified.
///
/// The path is made absolute and `~` is expanded; symlinks are not
/// followed.
pub fn resolve_working_dir(cwd: Option<&PathBuf>) -> Result<PathBuf, CliError> {
    let path = match cwd {
        Some(p) => p.clone(),
        None => env::current_dir()?,
    };
    let resolved = normalize(&path).map_err(CliError::from)?;
    if !resolved.as_path().is_dir() {
        return Err(CliError::InvalidArguments(format!(
            "{resolved} is not a directory"
        )));
    }
    Ok(resolved.into_path_buf())
}

/// Load the build file and register its tasks.
///
/// The project root is the directory holding the build file.
pub fn load_project(global: &GlobalOptions) -> Result<Project, CliError> {
    let working_dir = resolve_working_dir(global.cwd.as_ref())?;
    let mut builder = ConfigBuilder::new().with_working_dir(&working_dir);
    if let Some(file) = &global.file {
        builder = builder.with_file(file);
    }

    let file = builder
        .locate()?
        .ok_or_else(|| CliError::NoBuildFile(working_dir.display().to_string()))?;
    log::debug!("using build file {}", file.display());

    let config = builder.build()?;
    let root = normalize(&file)
        .map(|file| pipewright::path::parent(&file))
        .or_else(|_| DirectoryPath::new(&working_dir))?;
    Ok(Project::from_config(&config, root)?)
}
