//! List command implementation.
//!
//! Prints the declared tasks, one per line, in declaration order.

use crate::error::CliError;
use crate::utils::{load_project, GlobalOptions};
use pipewright::{Task, TaskRegistry};
use std::io::Write;

/// List the declared tasks.
#[derive(Debug, Default)]
pub struct ListCommand;

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let project = load_project(global)?;

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write_tasks(&mut handle, project.registry())?;
        Ok(())
    }
}

/// Write one tab-separated line per task: name, composition, description.
fn write_tasks(out: &mut impl Write, registry: &TaskRegistry) -> std::io::Result<()> {
    for task in registry.tasks() {
        writeln!(
            out,
            "{}\t{}\t{}",
            task.name(),
            composition(task),
            task.description().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn composition(task: &Task) -> String {
    let subtasks = task.subtasks();
    if subtasks.is_empty() {
        return "-".to_string();
    }
    subtasks
        .iter()
        .map(Task::name)
        .collect::<Vec<_>>()
        .join(",")
}
