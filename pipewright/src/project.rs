//! Tasks declared by a build file.

use std::path::PathBuf;

use crate::config::{BuildConfig, SrcDefinition, TaskDefinition};
use crate::error::{Error, Result};
use crate::file::FileCollection;
use crate::path::{set_case_sensitivity, CaseSensitivity, DirectoryPath};
use crate::plug::{Dest, Src};
use crate::task::{Pipeline, Run, Task, TaskRegistry, TaskSpec};

/// A registry built from a [`BuildConfig`], rooted at a project directory.
///
/// # Examples
///
/// ```
/// use pipewright::config::BuildConfig;
/// use pipewright::path::DirectoryPath;
/// use pipewright::Project;
///
/// let config: BuildConfig = serde_yaml::from_str(
///     "tasks:\n  - name: scripts\n    src:\n      patterns: ['*.js']\n  - name: default\n    series: [scripts]\n",
/// )
/// .unwrap();
/// let project = Project::from_config(&config, DirectoryPath::new("/project").unwrap()).unwrap();
/// assert_eq!(project.registry().len(), 2);
/// ```
#[derive(Debug)]
pub struct Project {
    root: DirectoryPath,
    registry: TaskRegistry,
}

impl Project {
    /// Register every task of `config`, in declaration order.
    ///
    /// A `case_sensitive` setting replaces the process-wide case policy.
    ///
    /// # Errors
    ///
    /// `UnknownTaskReference` if a combinator names a task declared after
    /// it or not at all, and `DuplicateTask` for a name used twice.
    pub fn from_config(config: &BuildConfig, root: DirectoryPath) -> Result<Self> {
        if let Some(sensitive) = config.case_sensitive {
            set_case_sensitivity(Some(if sensitive {
                CaseSensitivity::Sensitive
            } else {
                CaseSensitivity::Insensitive
            }));
        }

        let source_maps = config.source_maps.unwrap_or_default();
        let dest = |dir: PathBuf| {
            Dest::new(dir)
                .source_maps(source_maps.output())
                .produce(source_maps.produce_options())
        };

        let mut registry = TaskRegistry::new();
        for definition in &config.tasks {
            let spec = spec(definition);
            let references: Vec<&str> = definition.references().iter().map(String::as_str).collect();
            if let Some(src) = &definition.src {
                let mut pipeline = Pipeline::new(source(src));
                for plug in &src.plugs {
                    pipeline = pipeline.pipe_shared(plug.build());
                }
                if let Some(dir) = &src.dest {
                    pipeline = pipeline.pipe(dest(dir.clone()));
                }
                registry.register(Task::pipeline(spec, pipeline))?;
            } else if definition.parallel.is_some() {
                registry.parallel(spec, &references)?;
            } else {
                registry.series(spec, &references)?;
            }
        }

        Ok(Self { root, registry })
    }

    /// The project directory; task paths are relative to it.
    #[must_use]
    pub fn root(&self) -> &DirectoryPath {
        &self.root
    }

    /// The registered tasks.
    #[must_use]
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Run the tasks named `names` one after another in a single run.
    ///
    /// Tasks shared between them execute once. The output is the last
    /// task's.
    ///
    /// # Errors
    ///
    /// `UnknownTaskReference` before anything runs if a name is not
    /// registered, otherwise `TaskFailed` for the first task that fails.
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> Result<FileCollection> {
        let tasks = names
            .iter()
            .map(|name| self.registry.resolve(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let run = Run::new(self.root.clone());
        let mut last = run.files().fork();
        for task in tasks {
            last = task.run(&run).await.map_err(|source| Error::TaskFailed {
                task: task.name().to_string(),
                source,
            })?;
        }
        Ok(last)
    }
}

fn spec(definition: &TaskDefinition) -> TaskSpec {
    let spec = TaskSpec::new(definition.name.clone());
    match &definition.description {
        Some(description) => spec.description(description.clone()),
        None => spec,
    }
}

fn source(src: &SrcDefinition) -> Src {
    let source = Src::new(src.patterns.iter().cloned());
    match &src.base {
        Some(base) => source.base(base.clone()),
        None => source,
    }
}
