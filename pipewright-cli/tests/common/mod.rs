//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers
//! - Project fixtures

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch project directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new, empty project directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// A command running in the project directory with a clean environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pipewright").expect("Failed to find pipewright binary");
        cmd.current_dir(&self.temp_path)
            .env_remove("PIPEWRIGHT_FILE")
            .env_remove("PIPEWRIGHT_LOG_MODE")
            .env_remove("PIPEWRIGHT_SOURCE_MAPS")
            .env_remove("PIPEWRIGHT_CASE_SENSITIVE");
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Read a file of the project.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.temp_path.join(relative)).expect("Failed to read file")
    }

    /// Write the build file.
    pub fn build_file(&self, yaml: &str) -> PathBuf {
        self.write("pipewright.yaml", yaml)
    }
}

/// A build file with a script pipeline, a style copy and combinators.
pub const SAMPLE_BUILD: &str = r#"
tasks:
  - name: scripts
    description: Bundle scripts
    src:
      patterns: ["**/*.js"]
      base: src
      plugs:
        - kind: banner
          text: "/* built */\n"
      dest: dist
  - name: styles
    src:
      patterns: ["*.css"]
      base: src
      dest: dist
  - name: default
    parallel: [scripts, styles]
"#;
