//! CLI structure and argument definitions.
//!
//! This module defines the command-line interface using clap's derive
//! macros. There are no subcommands: the positional arguments name the
//! tasks to run.

use clap::Parser;
use std::path::PathBuf;

/// Task name run when none is given.
pub const DEFAULT_TASK: &str = "default";

/// Run the tasks declared in a pipewright build file.
#[derive(Parser, Debug)]
#[command(name = "pipewright")]
#[command(version, about = "Run build pipeline tasks", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long)]
    pub quiet: bool,

    /// Build file to use instead of searching for pipewright.yaml
    #[arg(long, short = 'f', value_name = "PATH", env = "PIPEWRIGHT_FILE")]
    pub file: Option<PathBuf>,

    /// Working directory to run in
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// List the declared tasks instead of running them
    #[arg(long = "tasks", short = 'T')]
    pub list_tasks: bool,

    /// Tasks to run, in order
    #[arg(value_name = "TASK", default_value = DEFAULT_TASK)]
    pub tasks: Vec<String>,
}
