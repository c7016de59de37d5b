#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # pipewright
//!
//! A library for composable build pipelines over virtual files.
//!
//! Files are read lazily and at most once, live in directory-rooted
//! collections, and carry source maps that are combined across every
//! transformation step. Named tasks transform collections and are memoized
//! per run, so a task shared by several others executes once.
//!
//! ## Core Types
//!
//! - [`File`] and [`FileCollection`]: the virtual file model
//! - [`SourceMap`]: parsed maps and their composition
//! - [`Task`], [`Run`] and [`TaskRegistry`]: the scheduler
//! - [`Project`]: tasks declared by a build file
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use pipewright::file::AddOptions;
//! use pipewright::path::DirectoryPath;
//! use pipewright::plug::Banner;
//! use pipewright::task::{Pipeline, Plug};
//! use pipewright::{Run, Task};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let run = Run::new(DirectoryPath::new("/project").unwrap());
//!     let files = run.files().fork();
//!     files.add("a.js", AddOptions::contents("a();")).unwrap();
//!
//!     let out = Banner::new("// hello\n").apply(files, &run).await.unwrap();
//!     let a = out.get("a.js").unwrap();
//!     assert_eq!(&*a.contents().await.unwrap(), "// hello\na();");
//!     assert!(a.source_map().await.unwrap().is_some());
//! });
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod path;
pub mod plug;
mod project;
pub mod source_map;
pub mod task;

// Re-export key types at crate root for convenience
pub use config::{BuildConfig, ConfigBuilder};
pub use error::{Error, Result, SharedError};
pub use file::{AddOptions, File, FileCollection};
pub use logging::{init_logger, LogLevel, Logger};
pub use path::{AbsolutePath, CaseSensitivity, DirectoryPath, PathRelationship};
pub use project::Project;
pub use source_map::{ProduceOptions, SourceMap, SourceMapJson};
pub use task::{Pipeline, Plug, Run, Source, Task, TaskRegistry, TaskSpec};
