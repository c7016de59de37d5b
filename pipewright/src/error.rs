//! Error types for the pipewright library.
//!
//! This module provides the error hierarchy shared by the path model, the
//! file abstraction, the source-map engine and the task scheduler, using
//! `thiserror` for ergonomic error handling.

use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias for operations that may fail with a pipewright error.
///
/// # Examples
///
/// ```
/// use pipewright::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// A failure shared by every caller that observed it.
///
/// Task results are memoized per run, so a failure is handed out by reference
/// to each caller instead of being cloned.
pub type SharedError = Arc<Error>;

/// The main error type for the pipewright library.
#[derive(Debug, Error)]
pub enum Error {
    /// A path could not be expressed in the absolute path grammar.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// A file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A path names a directory where a file was expected.
    #[error("not a file: {}", path.display())]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// A file was added outside of its collection's root directory.
    #[error("{} is outside of the collection root {}", path.display(), root.display())]
    OutOfScope {
        /// The path that was added.
        path: PathBuf,
        /// The root directory of the collection.
        root: PathBuf,
    },

    /// A mandatory source-map field was malformed.
    #[error("invalid source map {}: {reason}", path.display())]
    InvalidSourceMap {
        /// The file the source map belongs to.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Two different tasks were registered under the same name.
    #[error("duplicate task '{name}': declared at {first} and again at {second}")]
    DuplicateTask {
        /// The contested task name.
        name: String,
        /// Where the registered task was declared.
        first: &'static Location<'static>,
        /// Where the rejected task was declared.
        second: &'static Location<'static>,
    },

    /// A task list named a task that is not registered.
    #[error("unknown task '{name}'")]
    UnknownTaskReference {
        /// The name that could not be resolved.
        name: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A build file extends itself, directly or through other files.
    #[error("build file extends cycle: {}", chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    ConfigCycle {
        /// The files forming the cycle, in the order they were visited.
        chain: Vec<PathBuf>,
    },

    /// A discovery pattern was rejected.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Glob {
        /// The pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A spawned worker (a blocking read or a task execution) was lost.
    #[error("worker failed: {0}")]
    Join(String),

    /// A cached failure observed again.
    ///
    /// Read-once file state and settled tasks hand their failure out by
    /// reference; [`Error::root`] looks through the wrapper.
    #[error(transparent)]
    Shared(#[from] SharedError),

    /// A task settled with a failure.
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        /// The name of the failing task.
        task: String,
        /// The failure it settled with.
        #[source]
        source: SharedError,
    },
}

impl Error {
    /// Check if error indicates a file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipewright::Error;
    /// use std::path::PathBuf;
    ///
    /// let err = Error::NotFound { path: PathBuf::from("/nonexistent") };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::TaskFailed { source, .. } | Self::Shared(source) => source.is_not_found(),
            _ => false,
        }
    }

    /// Check if error indicates a directory was read as a file.
    #[must_use]
    pub fn is_not_a_file(&self) -> bool {
        match self {
            Self::NotAFile { .. } => true,
            Self::TaskFailed { source, .. } | Self::Shared(source) => source.is_not_a_file(),
            _ => false,
        }
    }

    /// The underlying failure, looking through [`Error::Shared`] wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use pipewright::Error;
    ///
    /// let err = Error::Shared(Arc::new(Error::Join("lost".to_string())));
    /// assert!(matches!(err.root(), Error::Join(_)));
    /// ```
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Self::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// Translate an I/O error for `path` into the file taxonomy.
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            _ if path.is_dir() => Self::NotAFile {
                path: path.to_path_buf(),
            },
            _ => Self::Io(err),
        }
    }
}
