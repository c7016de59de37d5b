//! Build file validation.
//!
//! Checks the shape of task definitions before any task is built. Whether
//! the names a combinator refers to exist is checked when tasks are
//! registered.

use crate::config::schema::{BuildConfig, PlugSpec, TaskDefinition};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validates build files.
///
/// # Examples
///
/// ```
/// use pipewright::config::{BuildConfig, ConfigValidator};
///
/// let config = BuildConfig::default();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete build file.
    ///
    /// # Errors
    ///
    /// Returns validation errors for invalid definitions.
    pub fn validate(config: &BuildConfig) -> Result<()> {
        let mut seen = HashSet::new();
        for task in &config.tasks {
            Self::validate_identifier("tasks.name", &task.name)?;
            if !seen.insert(task.name.as_str()) {
                return Err(Error::Validation {
                    field: format!("tasks.{}", task.name),
                    message: "Task is declared more than once".into(),
                });
            }
            Self::validate_task(task)?;
        }
        Ok(())
    }

    /// Validate task names.
    ///
    /// Checks that the name is non-empty after trimming, contains no null
    /// bytes, and is not longer than 255 characters.
    fn validate_identifier(field: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot be empty or only whitespace".into(),
            });
        }

        if trimmed.contains('\0') {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot contain null bytes".into(),
            });
        }

        if trimmed.len() > 255 {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot exceed 255 characters".into(),
            });
        }

        Ok(())
    }

    fn validate_task(task: &TaskDefinition) -> Result<()> {
        let field = format!("tasks.{}", task.name);

        match task.body_count() {
            1 => {}
            0 => {
                return Err(Error::Validation {
                    field,
                    message: "Task needs one of src, parallel or series".into(),
                })
            }
            _ => {
                return Err(Error::Validation {
                    field,
                    message: "Task may only declare one of src, parallel or series".into(),
                })
            }
        }

        if let Some(src) = &task.src {
            if src.patterns.iter().all(|p| p.trim().is_empty()) {
                return Err(Error::Validation {
                    field: format!("{field}.src.patterns"),
                    message: "At least one pattern is required".into(),
                });
            }
            for plug in &src.plugs {
                Self::validate_plug(&field, plug)?;
            }
        }

        for reference in task.references() {
            if reference == &task.name {
                return Err(Error::Validation {
                    field,
                    message: "Task cannot include itself".into(),
                });
            }
        }

        Ok(())
    }

    fn validate_plug(field: &str, plug: &PlugSpec) -> Result<()> {
        match plug {
            PlugSpec::Rename { extension } if extension.trim_start_matches('.').is_empty() => {
                Err(Error::Validation {
                    field: format!("{field}.src.plugs"),
                    message: "rename needs a non-empty extension".into(),
                })
            }
            PlugSpec::Rename { extension } if extension.contains('/') => Err(Error::Validation {
                field: format!("{field}.src.plugs"),
                message: format!("Invalid extension '{extension}'"),
            }),
            _ => Ok(()),
        }
    }
}
