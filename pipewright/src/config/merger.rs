//! Build file merging.
//!
//! An `extends` chain is merged parent first: the child overrides scalars,
//! and task definitions are replaced by name.

use crate::config::loader::ConfigSource;
use crate::config::schema::{BuildConfig, SourceMapConfig};

/// Merges build files according to precedence rules.
///
/// # Examples
///
/// ```
/// use pipewright::config::{BuildConfig, ConfigMerger};
///
/// let parent = BuildConfig { case_sensitive: Some(true), ..Default::default() };
/// let child = BuildConfig { case_sensitive: Some(false), ..Default::default() };
///
/// let mut result = parent;
/// ConfigMerger::merge_into(&mut result, &child);
/// assert_eq!(result.case_sensitive, Some(false));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge a chain of build files, lowest precedence first.
    #[must_use]
    pub fn merge(sources: Vec<ConfigSource>) -> BuildConfig {
        let mut result = BuildConfig::default();
        for source in sources {
            Self::merge_into(&mut result, &source.config);
        }
        result
    }

    /// Merge `source` into `target` (source overwrites target).
    ///
    /// # Merging Rules
    ///
    /// - Simple fields: source overwrites if Some
    /// - Source map settings: field-by-field merge
    /// - Tasks: a task of the same name is replaced in place, new tasks are
    ///   appended
    /// - `extends` is consumed by loading and never carried over
    pub fn merge_into(target: &mut BuildConfig, source: &BuildConfig) {
        target.extends = None;

        if source.case_sensitive.is_some() {
            target.case_sensitive = source.case_sensitive;
        }

        if let Some(ref source_maps) = source.source_maps {
            target.source_maps = Some(match &target.source_maps {
                Some(existing) => Self::merge_source_maps(existing, source_maps),
                None => *source_maps,
            });
        }

        for task in &source.tasks {
            match target.tasks.iter_mut().find(|t| t.name == task.name) {
                Some(existing) => *existing = task.clone(),
                None => target.tasks.push(task.clone()),
            }
        }
    }

    fn merge_source_maps(target: &SourceMapConfig, source: &SourceMapConfig) -> SourceMapConfig {
        SourceMapConfig {
            combine: source.combine.or(target.combine),
            sources_content: source.sources_content.or(target.sources_content),
            output: source.output.or(target.output),
        }
    }
}
