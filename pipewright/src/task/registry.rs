//! The task registry.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::{Task, TaskSpec};

/// Named tasks, in declaration order.
///
/// # Examples
///
/// ```
/// use pipewright::{Task, TaskRegistry};
///
/// let mut registry = TaskRegistry::new();
/// registry.register(Task::series("clean", vec![])).unwrap();
/// registry.register(Task::series("compile", vec![])).unwrap();
/// let build = registry.series("build", &["clean", "compile"]).unwrap();
///
/// assert_eq!(build.subtasks().len(), 2);
/// assert!(registry.series("broken", &["missing"]).is_err());
/// ```
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    by_name: HashMap<String, usize>,
}

impl TaskRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under its name.
    ///
    /// Registering the same task again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTask`, naming both declaration sites, if a different
    /// task already has this name.
    pub fn register(&mut self, task: Task) -> Result<Task> {
        if let Some(&index) = self.by_name.get(task.name()) {
            let existing = &self.tasks[index];
            if Task::ptr_eq(existing, &task) {
                return Ok(task);
            }
            return Err(Error::DuplicateTask {
                name: task.name().to_string(),
                first: existing.declared_at(),
                second: task.declared_at(),
            });
        }

        log::debug!("registered task '{}' ({})", task.name(), task.declared_at());
        self.by_name.insert(task.name().to_string(), self.tasks.len());
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// The task named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.by_name.get(name).map(|&index| &self.tasks[index])
    }

    /// The task named `name`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTaskReference` if no task has that name.
    pub fn resolve(&self, name: &str) -> Result<Task> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTaskReference {
                name: name.to_string(),
            })
    }

    /// Every task, in registration order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Register a parallel composition of already registered tasks.
    ///
    /// # Errors
    ///
    /// `UnknownTaskReference` for a name that is not registered, or
    /// `DuplicateTask` if the new name is taken.
    #[track_caller]
    pub fn parallel(&mut self, spec: impl Into<TaskSpec>, names: &[&str]) -> Result<Task> {
        let tasks = self.resolve_all(names)?;
        self.register(Task::parallel(spec, tasks))
    }

    /// Register a series composition of already registered tasks.
    ///
    /// # Errors
    ///
    /// `UnknownTaskReference` for a name that is not registered, or
    /// `DuplicateTask` if the new name is taken.
    #[track_caller]
    pub fn series(&mut self, spec: impl Into<TaskSpec>, names: &[&str]) -> Result<Task> {
        let tasks = self.resolve_all(names)?;
        self.register(Task::series(spec, tasks))
    }

    fn resolve_all(&self, names: &[&str]) -> Result<Vec<Task>> {
        names.iter().map(|name| self.resolve(name)).collect()
    }
}
