//! Build file schema definitions.
//!
//! A build file declares the project's tasks and how source maps are
//! produced when files are written.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::plug::{Banner, Footer, Relocate, Rename, SourceMapOutput};
use crate::source_map::ProduceOptions;
use crate::task::Plug;

/// Name of the build file looked up when none is given.
pub const DEFAULT_BUILD_FILE: &str = "pipewright.yaml";

/// A parsed build file.
///
/// # Examples
///
/// ```
/// use pipewright::config::BuildConfig;
///
/// let config: BuildConfig = serde_yaml::from_str(
///     "tasks:\n  - name: scripts\n    src:\n      patterns: ['src/**/*.js']\n      dest: dist\n",
/// )
/// .unwrap();
/// assert_eq!(config.tasks[0].name, "scripts");
/// assert!(config.tasks[0].src.is_some());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Parent build file, relative to this one.
    pub extends: Option<PathBuf>,

    /// Override the detected filesystem case sensitivity.
    pub case_sensitive: Option<bool>,

    /// How written files get their source maps.
    pub source_maps: Option<SourceMapConfig>,

    /// Task definitions, in declaration order.
    #[serde(default)]
    pub tasks: Vec<TaskDefinition>,
}

impl BuildConfig {
    /// The definition of the task named `name`.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|task| task.name == name)
    }
}

/// Source map settings.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SourceMapConfig {
    /// Fold maps through the whole transformation chain (default true).
    pub combine: Option<bool>,

    /// Embed source text in written maps (default true).
    pub sources_content: Option<bool>,

    /// Where written maps go (default sibling).
    pub output: Option<SourceMapOutput>,
}

impl SourceMapConfig {
    /// Options for producing maps.
    #[must_use]
    pub fn produce_options(&self) -> ProduceOptions {
        let defaults = ProduceOptions::default();
        ProduceOptions {
            combine_source_maps: self.combine.unwrap_or(defaults.combine_source_maps),
            sources_content: self.sources_content.unwrap_or(defaults.sources_content),
        }
    }

    /// Where maps are written.
    #[must_use]
    pub fn output(&self) -> SourceMapOutput {
        self.output.unwrap_or_default()
    }
}

/// One named task.
///
/// Exactly one of `src`, `parallel` and `series` is set.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinition {
    /// The task name.
    pub name: String,

    /// Shown when listing tasks.
    pub description: Option<String>,

    /// A pipeline over discovered files.
    pub src: Option<SrcDefinition>,

    /// Tasks to run concurrently, merging their outputs.
    pub parallel: Option<Vec<String>>,

    /// Tasks to run one after another.
    pub series: Option<Vec<String>>,
}

impl TaskDefinition {
    /// Names of the tasks this one composes.
    #[must_use]
    pub fn references(&self) -> &[String] {
        self.parallel
            .as_deref()
            .or(self.series.as_deref())
            .unwrap_or_default()
    }

    /// Number of bodies declared.
    #[must_use]
    pub fn body_count(&self) -> usize {
        usize::from(self.src.is_some())
            + usize::from(self.parallel.is_some())
            + usize::from(self.series.is_some())
    }
}

/// A discovery pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SrcDefinition {
    /// Glob patterns; a leading `!` excludes.
    pub patterns: Vec<String>,

    /// Directory the patterns are relative to.
    pub base: Option<PathBuf>,

    /// Plugs applied in order.
    #[serde(default)]
    pub plugs: Vec<PlugSpec>,

    /// Directory the result is written to.
    pub dest: Option<PathBuf>,
}

/// A built-in plug, selected by its `kind`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlugSpec {
    /// Prepend text.
    Banner {
        /// The text.
        text: String,
    },
    /// Append text.
    Footer {
        /// The text.
        text: String,
    },
    /// Change the extension.
    Rename {
        /// The new extension.
        extension: String,
    },
    /// Move to another directory.
    Relocate {
        /// Target directory, relative to the working directory.
        to: PathBuf,
    },
}

impl PlugSpec {
    /// Instantiate the plug.
    #[must_use]
    pub fn build(&self) -> Arc<dyn Plug> {
        match self {
            Self::Banner { text } => Arc::new(Banner::new(text.clone())),
            Self::Footer { text } => Arc::new(Footer::new(text.clone())),
            Self::Rename { extension } => Arc::new(Rename::new(extension.clone())),
            Self::Relocate { to } => Arc::new(Relocate::new(to.clone())),
        }
    }
}
