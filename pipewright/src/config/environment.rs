//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `PIPEWRIGHT_*` environment variables
//! that override build file values.

use crate::config::schema::BuildConfig;
use crate::error::{Error, Result};
use crate::plug::SourceMapOutput;
use std::env;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use pipewright::config::{BuildConfig, EnvironmentConfig};
///
/// let mut config = BuildConfig::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid.
    pub fn apply_overrides(config: &mut BuildConfig) -> Result<()> {
        // PIPEWRIGHT_CASE_SENSITIVE
        if let Ok(val) = env::var("PIPEWRIGHT_CASE_SENSITIVE") {
            config.case_sensitive = Some(Self::parse_bool("PIPEWRIGHT_CASE_SENSITIVE", &val)?);
        }

        // PIPEWRIGHT_SOURCE_MAPS
        if let Ok(val) = env::var("PIPEWRIGHT_SOURCE_MAPS") {
            let output = val.parse::<SourceMapOutput>().map_err(|message| Error::Validation {
                field: "PIPEWRIGHT_SOURCE_MAPS".into(),
                message,
            })?;
            config.source_maps.get_or_insert_with(Default::default).output = Some(output);
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
