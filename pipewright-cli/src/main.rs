//! Main entry point for the pipewright CLI.
//!
//! Loads the nearest `pipewright.yaml` and either runs the named tasks or,
//! with `--tasks`, lists them.

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use commands::{ListCommand, RunCommand};
use utils::GlobalOptions;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    pipewright::init_logger(cli.verbose, cli.quiet).install();

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        file: cli.file,
        cwd: cli.cwd,
    };

    // Execute the command
    let result = if cli.list_tasks {
        ListCommand.execute(&global)
    } else {
        RunCommand { tasks: cli.tasks }.execute(&global).await
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
