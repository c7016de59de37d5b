//! Layered construction of the effective build configuration.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::BuildConfig;
use crate::config::validator::ConfigValidator;
use crate::error::{Error, Result};

/// Builds a [`BuildConfig`] from the build file chain, the environment and
/// programmatic overrides, in that order of increasing precedence.
///
/// # Examples
///
/// ```
/// use pipewright::config::{BuildConfig, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_config(BuildConfig { case_sensitive: Some(true), ..Default::default() })
///     .build()
///     .unwrap();
/// assert_eq!(config.case_sensitive, Some(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    working_dir: Option<PathBuf>,
    file: Option<PathBuf>,
    skip_files: bool,
    skip_env: bool,
    overrides: Option<BuildConfig>,
}

impl ConfigBuilder {
    /// A builder that searches from the process working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for the build file from `dir`.
    #[must_use]
    pub fn with_working_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Use this build file instead of searching, relative to the working
    /// directory.
    #[must_use]
    pub fn with_file(mut self, file: &Path) -> Self {
        self.file = Some(file.to_path_buf());
        self
    }

    /// Do not read any build file.
    #[must_use]
    pub fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Ignore `PIPEWRIGHT_*` variables.
    #[must_use]
    pub fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Merge `config` over everything else.
    #[must_use]
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.overrides = Some(config);
        self
    }

    /// The build file that [`build`](Self::build) reads, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn locate(&self) -> Result<Option<PathBuf>> {
        if self.skip_files {
            return Ok(None);
        }
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => env::current_dir().map_err(Error::Io)?,
        };
        Ok(match &self.file {
            Some(file) => Some(working_dir.join(file)),
            None => ConfigLoader::find(&working_dir),
        })
    }

    /// Load, merge and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if a build file cannot be loaded, an environment
    /// variable is invalid or the result fails validation.
    pub fn build(&self) -> Result<BuildConfig> {
        let mut config = match self.locate()? {
            Some(file) => ConfigMerger::merge(ConfigLoader::load_chain(&file)?),
            None => BuildConfig::default(),
        };

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        if let Some(overrides) = &self.overrides {
            ConfigMerger::merge_into(&mut config, overrides);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}
