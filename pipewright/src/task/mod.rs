//! Tasks and their scheduling.
//!
//! A [`Task`] is a named unit of work producing a [`FileCollection`]. Its
//! body is a [`Pipeline`], an async function, or a parallel or series
//! composition of other tasks. Within one [`Run`] a task executes at most
//! once: every caller shares the one in-flight or settled result.
//!
//! # Examples
//!
//! ```
//! use pipewright::file::AddOptions;
//! use pipewright::path::DirectoryPath;
//! use pipewright::{Run, Task};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let hello = Task::from_fn("hello", |run| async move {
//!         let files = run.files().fork();
//!         files.add("hello.txt", AddOptions::contents("hi"))?;
//!         Ok(files)
//!     });
//!
//!     let run = Run::new(DirectoryPath::new("/project").unwrap());
//!     let first = hello.run(&run).await.unwrap();
//!     let second = hello.run(&run).await.unwrap();
//!     assert!(pipewright::FileCollection::ptr_eq(&first, &second));
//! });
//! ```

mod combinators;
mod pipeline;
mod registry;
mod run;

use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt};

use crate::error::Result;
use crate::file::FileCollection;

pub use pipeline::{plug_fn, source_fn, FnPlug, FnSource, Pipeline, Plug, Source};
pub use registry::TaskRegistry;
pub use run::{Run, TaskFuture, TaskResult};

static NEXT_TASK: AtomicU64 = AtomicU64::new(1);

/// Identity of a task instance; the key of per-run memoization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Name and description of a task.
///
/// Strings convert into a `TaskSpec` without a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Registry name.
    pub name: String,
    /// Shown when listing tasks.
    pub description: Option<String>,
}

impl TaskSpec {
    /// A `TaskSpec` named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&str> for TaskSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TaskSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

type Action = Arc<dyn Fn(Run) -> BoxFuture<'static, Result<FileCollection>> + Send + Sync>;

enum Body {
    Pipeline(Pipeline),
    Action(Action),
    Parallel(Vec<Task>),
    Series(Vec<Task>),
}

impl Body {
    fn kind(&self) -> &'static str {
        match self {
            Self::Pipeline(_) => "pipeline",
            Self::Action(_) => "function",
            Self::Parallel(_) => "parallel",
            Self::Series(_) => "series",
        }
    }
}

/// A named, per-run memoized unit of work.
///
/// `Task` is a cheap handle; clones are the same task. Constructors record
/// the caller's source location as the declaration site.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    id: TaskId,
    spec: TaskSpec,
    declared_at: &'static Location<'static>,
    body: Body,
}

impl Task {
    #[track_caller]
    fn build(spec: TaskSpec, body: Body) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                id: TaskId(NEXT_TASK.fetch_add(1, Ordering::Relaxed)),
                spec,
                declared_at: Location::caller(),
                body,
            }),
        }
    }

    /// A task that executes `pipeline`.
    #[track_caller]
    #[must_use]
    pub fn pipeline(spec: impl Into<TaskSpec>, pipeline: Pipeline) -> Self {
        Self::build(spec.into(), Body::Pipeline(pipeline))
    }

    /// A task backed by an async function.
    #[track_caller]
    #[must_use]
    pub fn from_fn<F, Fut>(spec: impl Into<TaskSpec>, f: F) -> Self
    where
        F: Fn(Run) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FileCollection>> + Send + 'static,
    {
        let action: Action = Arc::new(move |run| f(run).boxed());
        Self::build(spec.into(), Body::Action(action))
    }

    /// A task running `tasks` concurrently and merging their outputs.
    ///
    /// On a path conflict the subtask that settled last wins.
    #[track_caller]
    #[must_use]
    pub fn parallel(spec: impl Into<TaskSpec>, tasks: Vec<Task>) -> Self {
        Self::build(spec.into(), Body::Parallel(tasks))
    }

    /// A task running `tasks` one after another, producing the last output.
    #[track_caller]
    #[must_use]
    pub fn series(spec: impl Into<TaskSpec>, tasks: Vec<Task>) -> Self {
        Self::build(spec.into(), Body::Series(tasks))
    }

    /// The registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.spec.name
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.inner.spec.description.as_deref()
    }

    /// Where the task was constructed.
    #[must_use]
    pub fn declared_at(&self) -> &'static Location<'static> {
        self.inner.declared_at
    }

    /// Identity used for memoization.
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// Direct subtasks of a parallel or series task.
    #[must_use]
    pub fn subtasks(&self) -> &[Task] {
        match &self.inner.body {
            Body::Parallel(tasks) | Body::Series(tasks) => tasks,
            Body::Pipeline(_) | Body::Action(_) => &[],
        }
    }

    /// Whether both handles are the same task.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Execute within `run`, or join the execution already started there.
    ///
    /// The returned future can be awaited, cloned and awaited again; all
    /// observers receive the same settled value.
    pub fn run(&self, run: &Run) -> TaskFuture {
        run.memoize(self.id(), || {
            let task = self.clone();
            let run = run.clone();
            async move { task.execute(run).await }.boxed()
        })
    }

    async fn execute(self, run: Run) -> TaskResult {
        log::info!("Starting '{}'...", self.name());
        let started = Instant::now();

        let result = match &self.inner.body {
            Body::Pipeline(pipeline) => pipeline.execute(&run).await,
            Body::Action(action) => action(run.clone()).await,
            Body::Parallel(tasks) => combinators::run_parallel(tasks, &run).await,
            Body::Series(tasks) => combinators::run_series(tasks, &run).await,
        };

        match &result {
            Ok(files) => log::info!(
                "Finished '{}' after {:.2?} ({} file(s))",
                self.name(),
                started.elapsed(),
                files.len()
            ),
            Err(e) => log::debug!("'{}' failed after {:.2?}: {e}", self.name(), started.elapsed()),
        }
        result.map_err(Arc::new)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("kind", &self.inner.body.kind())
            .field("declared_at", &self.inner.declared_at.to_string())
            .finish()
    }
}
