//! Run command implementation.
//!
//! Runs the requested tasks in order within a single run, so a task shared
//! by several of them executes once.

use crate::error::CliError;
use crate::utils::{load_project, GlobalOptions};

/// Run named tasks.
#[derive(Debug)]
pub struct RunCommand {
    /// Task names, in order.
    pub tasks: Vec<String>,
}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.tasks.is_empty() {
            return Err(CliError::InvalidArguments("no task to run".into()));
        }

        let project = load_project(global)?;
        let files = project.run(&self.tasks).await?;
        log::debug!(
            "{} produced {} file(s) below {}",
            self.tasks.join(", "),
            files.len(),
            files.root()
        );
        Ok(())
    }
}
