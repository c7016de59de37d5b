//! Parallel and series composition.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::{Error, Result};
use crate::file::FileCollection;
use crate::path::common_ancestor;

use super::run::{Run, TaskResult};
use super::Task;

/// Run `tasks` concurrently and merge their outputs.
///
/// Outputs are merged in the order the subtasks settled, so on a path
/// conflict the file of the subtask that finished last wins. The first
/// failure in declaration order is reported after all have settled.
pub(crate) async fn run_parallel(tasks: &[Task], run: &Run) -> Result<FileCollection> {
    let mut pending: FuturesUnordered<_> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let execution = task.run(run);
            async move { (index, execution.await) }
        })
        .collect();

    let mut settled: Vec<Option<TaskResult>> = vec![None; tasks.len()];
    let mut completion = Vec::with_capacity(tasks.len());
    while let Some((index, result)) = pending.next().await {
        completion.push(index);
        settled[index] = Some(result);
    }

    let mut outputs = Vec::with_capacity(tasks.len());
    for (task, result) in tasks.iter().zip(&settled) {
        match result {
            Some(Ok(files)) => outputs.push(files.clone()),
            Some(Err(source)) => {
                return Err(Error::TaskFailed {
                    task: task.name().to_string(),
                    source: source.clone(),
                })
            }
            None => {}
        }
    }

    let root = outputs
        .iter()
        .map(|files| files.root().clone())
        .reduce(|a, b| common_ancestor(&a, &b))
        .unwrap_or_else(|| run.working_dir().clone());
    let merged = run.files().fork_at(root);

    for index in completion {
        if let Some(Ok(files)) = &settled[index] {
            for file in files.list() {
                merged.add_file(file.absolute_path().as_path(), &file)?;
            }
        }
    }
    Ok(merged)
}

/// Run `tasks` one after another; the output is the last one's.
///
/// Stops at the first failure. With no subtasks the output is empty.
pub(crate) async fn run_series(tasks: &[Task], run: &Run) -> Result<FileCollection> {
    let mut last = None;
    for task in tasks {
        match task.run(run).await {
            Ok(files) => last = Some(files),
            Err(source) => {
                return Err(Error::TaskFailed {
                    task: task.name().to_string(),
                    source,
                })
            }
        }
    }
    Ok(last.unwrap_or_else(|| run.files().fork()))
}
