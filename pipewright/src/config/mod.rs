//! Build file configuration.
//!
//! This module provides layered configuration with support for:
//! - YAML build files (`pipewright.yaml`) with `extends` chains
//! - Environment variable overrides
//! - Programmatic configuration via builder pattern
//! - Validation of task definitions
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`PIPEWRIGHT_*`)
//! 3. The build file
//! 4. The files it extends, nearest first
//! 5. Built-in defaults
//!
//! # Examples
//!
//! Loading from a specific directory:
//!
//! ```no_run
//! use pipewright::config::ConfigBuilder;
//! use std::path::Path;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir(Path::new("/path/to/project"))
//!     .build()
//!     .unwrap();
//! for task in &config.tasks {
//!     println!("{}", task.name);
//! }
//! ```
//!
//! Programmatic configuration:
//!
//! ```
//! use pipewright::config::{BuildConfig, ConfigBuilder, TaskDefinition};
//!
//! let custom = BuildConfig {
//!     tasks: vec![TaskDefinition {
//!         name: "default".to_string(),
//!         series: Some(vec![]),
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(custom)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.tasks.len(), 1);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use schema::{
    BuildConfig, PlugSpec, SourceMapConfig, SrcDefinition, TaskDefinition, DEFAULT_BUILD_FILE,
};
pub use validator::ConfigValidator;
