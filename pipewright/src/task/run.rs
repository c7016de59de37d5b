//! Runs: the scope of task memoization.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::{Error, SharedError};
use crate::file::FileCollection;
use crate::path::DirectoryPath;

use super::TaskId;

/// What a task settles with.
///
/// Failures are shared, so every caller observing a settled task sees the
/// same error instance.
pub type TaskResult = std::result::Result<FileCollection, SharedError>;

/// A task's execution within one run.
///
/// Awaiting it (any number of times, from any number of callers) yields the
/// one settled result.
pub type TaskFuture = Shared<BoxFuture<'static, TaskResult>>;

static NEXT_RUN: AtomicU64 = AtomicU64::new(1);

/// One logical invocation.
///
/// Within a run every task executes at most once; later calls receive the
/// in-flight or settled result of the first. `Run` is a cheap handle.
///
/// # Examples
///
/// ```
/// use pipewright::path::DirectoryPath;
/// use pipewright::Run;
///
/// let run = Run::new(DirectoryPath::new("/project").unwrap());
/// let other = Run::new(DirectoryPath::new("/project").unwrap());
/// assert_ne!(run.id(), other.id());
/// ```
#[derive(Clone)]
pub struct Run {
    inner: Arc<RunInner>,
}

struct RunInner {
    id: u64,
    files: FileCollection,
    results: Mutex<HashMap<TaskId, TaskFuture>>,
}

impl Run {
    /// Start a run in `working_dir`, reading from disk.
    #[must_use]
    pub fn new(working_dir: DirectoryPath) -> Self {
        Self::with_files(FileCollection::new(working_dir))
    }

    /// Start a run whose shared file cache is `files`.
    ///
    /// The working directory is the collection's root.
    #[must_use]
    pub fn with_files(files: FileCollection) -> Self {
        Self {
            inner: Arc::new(RunInner {
                id: NEXT_RUN.fetch_add(1, Ordering::Relaxed),
                files,
                results: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Identity of this run.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The directory relative paths are resolved against.
    #[must_use]
    pub fn working_dir(&self) -> &DirectoryPath {
        self.inner.files.root()
    }

    /// The file cache shared by every task in this run.
    ///
    /// Tasks fork it rather than add to it.
    #[must_use]
    pub fn files(&self) -> &FileCollection {
        &self.inner.files
    }

    /// Whether `task` has been started in this run.
    #[must_use]
    pub fn has_started(&self, task: TaskId) -> bool {
        self.inner.results.lock().contains_key(&task)
    }

    /// The execution of `task`, starting it with `start` if this is the
    /// first request.
    ///
    /// Lookup and insertion happen under one lock, so concurrent first
    /// requests still start the task once. Inside a tokio runtime the
    /// execution is spawned and settles even if every caller stops waiting.
    pub(crate) fn memoize(
        &self,
        task: TaskId,
        start: impl FnOnce() -> BoxFuture<'static, TaskResult>,
    ) -> TaskFuture {
        self.inner
            .results
            .lock()
            .entry(task)
            .or_insert_with(|| detach(start()))
            .clone()
    }
}

/// Drive `execution` on the current runtime, if there is one.
fn detach(execution: BoxFuture<'static, TaskResult>) -> TaskFuture {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return execution.shared();
    };
    let handle = runtime.spawn(execution);
    async move {
        handle
            .await
            .unwrap_or_else(|e| Err(Arc::new(Error::Join(e.to_string()))))
    }
    .boxed()
    .shared()
}

impl fmt::Debug for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("id", &self.inner.id)
            .field("working_dir", self.working_dir())
            .field("started", &self.inner.results.lock().len())
            .finish()
    }
}
