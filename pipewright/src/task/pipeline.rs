//! Pipelines: a source followed by an ordered list of plugs.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::file::FileCollection;

use super::run::Run;

/// Produces the collection a pipeline starts from.
#[async_trait]
pub trait Source: Send + Sync {
    /// Load the initial files.
    async fn load(&self, run: &Run) -> Result<FileCollection>;
}

/// One transform stage.
///
/// A plug receives the previous stage's collection and returns a new one.
/// It should not add to the collection it was given.
#[async_trait]
pub trait Plug: Send + Sync {
    /// A short name for logs.
    fn name(&self) -> &str;

    /// Transform `files`.
    async fn apply(&self, files: FileCollection, run: &Run) -> Result<FileCollection>;
}

/// A source followed by plugs, applied strictly in order.
///
/// # Examples
///
/// ```
/// use pipewright::file::{AddOptions, FileCollection};
/// use pipewright::task::{plug_fn, source_fn, Pipeline};
///
/// let pipeline = Pipeline::new(source_fn(|run| async move {
///     let files = run.files().fork();
///     files.add("a.txt", AddOptions::contents("a"))?;
///     Ok(files)
/// }))
/// .pipe(plug_fn("upper", |files: FileCollection, _run| async move {
///     let out = files.clone_view(None);
///     for file in files.list() {
///         let text = file.contents().await?.to_uppercase();
///         out.add(file.absolute_path().as_path(), AddOptions::contents(text))?;
///     }
///     Ok(out)
/// }));
/// assert_eq!(pipeline.plug_names(), ["upper"]);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn Source>,
    plugs: Vec<Arc<dyn Plug>>,
}

impl Pipeline {
    /// A pipeline that only loads `source`.
    #[must_use]
    pub fn new(source: impl Source + 'static) -> Self {
        Self {
            source: Arc::new(source),
            plugs: Vec::new(),
        }
    }

    /// Append a stage.
    #[must_use]
    pub fn pipe(mut self, plug: impl Plug + 'static) -> Self {
        self.plugs.push(Arc::new(plug));
        self
    }

    /// Append an already shared stage.
    #[must_use]
    pub fn pipe_shared(mut self, plug: Arc<dyn Plug>) -> Self {
        self.plugs.push(plug);
        self
    }

    /// Names of the stages, in order.
    #[must_use]
    pub fn plug_names(&self) -> Vec<&str> {
        self.plugs.iter().map(|plug| plug.name()).collect()
    }

    /// Load the source and apply every stage to its output.
    ///
    /// # Errors
    ///
    /// The first failure of the source or of a stage.
    pub async fn execute(&self, run: &Run) -> Result<FileCollection> {
        let mut files = self.source.load(run).await?;
        for plug in &self.plugs {
            log::debug!("applying {} to {} file(s)", plug.name(), files.len());
            files = plug.apply(files, run).await?;
        }
        Ok(files)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("plugs", &self.plug_names())
            .finish_non_exhaustive()
    }
}

/// A [`Plug`] backed by a closure.
pub struct FnPlug<F> {
    name: String,
    f: F,
}

/// Adapt an async closure into a [`Plug`].
pub fn plug_fn<F, Fut>(name: impl Into<String>, f: F) -> FnPlug<F>
where
    F: Fn(FileCollection, Run) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FileCollection>> + Send + 'static,
{
    FnPlug {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<F, Fut> Plug for FnPlug<F>
where
    F: Fn(FileCollection, Run) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FileCollection>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, files: FileCollection, run: &Run) -> Result<FileCollection> {
        (self.f)(files, run.clone()).await
    }
}

/// A [`Source`] backed by a closure.
pub struct FnSource<F> {
    f: F,
}

/// Adapt an async closure into a [`Source`].
pub fn source_fn<F, Fut>(f: F) -> FnSource<F>
where
    F: Fn(Run) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FileCollection>> + Send + 'static,
{
    FnSource { f }
}

#[async_trait]
impl<F, Fut> Source for FnSource<F>
where
    F: Fn(Run) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FileCollection>> + Send + 'static,
{
    async fn load(&self, run: &Run) -> Result<FileCollection> {
        (self.f)(run.clone()).await
    }
}

/// Start a pipeline from a fixed collection.
#[async_trait]
impl Source for FileCollection {
    async fn load(&self, _run: &Run) -> Result<FileCollection> {
        Ok(self.clone())
    }
}
