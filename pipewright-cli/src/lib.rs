//! Library exports for pipewright-cli.
//!
//! This module exports the CLI structure and commands so they can be
//! driven from tests and other front ends.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
