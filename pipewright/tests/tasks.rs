//! Scheduling behaviour across composed tasks.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{dir, Workspace};
use pipewright::file::AddOptions;
use pipewright::plug::{Banner, Dest, Rename, Src};
use pipewright::task::{plug_fn, Pipeline};
use pipewright::{Error, FileCollection, Run, Task, TaskRegistry};

fn delayed_writer(name: &str, millis: u64, contents: &'static str) -> Task {
    Task::from_fn(name, move |run| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        let files = run.files().fork();
        files.add("x.txt", AddOptions::contents(contents))?;
        Ok(files)
    })
}

#[tokio::test]
async fn test_parallel_last_settled_wins() {
    let all = Task::parallel(
        "all",
        vec![
            delayed_writer("taskA", 20, "first"),
            delayed_writer("taskB", 10, "second"),
        ],
    );
    let run = Run::new(dir("/project"));
    let merged = all.run(&run).await.unwrap();

    assert_eq!(merged.len(), 1);
    let x = merged.get("x.txt").unwrap();
    assert_eq!(&*x.contents().await.unwrap(), "first");
}

#[tokio::test]
async fn test_memoized_failure_is_shared() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let failing = Task::from_fn("broken", move |_run| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<FileCollection, _>(Error::Join("boom".to_string()))
        }
    });

    let run = Run::new(dir("/project"));
    let first = failing.run(&run).await.unwrap_err();
    let second = failing.run(&run).await.unwrap_err();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A new run executes again.
    failing.run(&Run::new(dir("/project"))).await.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_series_failure_names_the_subtask() {
    let failing = Task::from_fn("lint", |_run| async {
        Err::<FileCollection, _>(Error::Join("boom".to_string()))
    });
    let after = delayed_writer("after", 0, "never");
    let build = Task::series("build", vec![failing, after.clone()]);

    let run = Run::new(dir("/project"));
    let err = build.run(&run).await.unwrap_err();
    assert_eq!(err.to_string(), "task 'lint' failed: worker failed: boom");
    assert!(!run.has_started(after.id()));
}

#[tokio::test]
async fn test_dropped_caller_does_not_cancel_subtasks() {
    let all = Task::parallel(
        "all",
        vec![
            delayed_writer("taskA", 30, "first"),
            delayed_writer("taskB", 10, "second"),
        ],
    );
    let run = Run::new(dir("/project"));

    let waited = tokio::time::timeout(Duration::from_millis(5), all.run(&run)).await;
    assert!(waited.is_err());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let merged = tokio::time::timeout(Duration::from_millis(5), all.run(&run))
        .await
        .expect("already settled")
        .unwrap();
    let x = merged.get("x.txt").unwrap();
    assert_eq!(&*x.contents().await.unwrap(), "first");
}

#[tokio::test]
async fn test_registry_rejects_a_second_build() {
    let mut registry = TaskRegistry::new();
    registry.register(Task::series("build", vec![])).unwrap();
    let err = registry.register(Task::series("build", vec![])).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("duplicate task 'build'"));
    assert_eq!(message.matches(file!()).count(), 2);
}

#[tokio::test]
async fn test_pipeline_over_disk() {
    let ws = Workspace::new();
    ws.write("src/main.ts", "main();\n");
    ws.write("src/lib/util.ts", "util();\n");
    ws.write("src/skip.txt", "skip");

    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let pipeline = Pipeline::new(Src::new(["**/*.ts"]).base("src"))
        .pipe(plug_fn("count", move |files: FileCollection, _run| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(files.len(), Ordering::SeqCst);
                Ok(files)
            }
        }))
        .pipe(Banner::new("// generated\n"))
        .pipe(Rename::new("js"))
        .pipe(Dest::new("dist"));
    let build = Task::pipeline("build", pipeline);

    let run = Run::new(ws.root());
    let out = build.run(&run).await.unwrap();

    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(out.len(), 2);
    assert_eq!(
        ws.read("dist/main.js"),
        "// generated\nmain();\n//# sourceMappingURL=main.js.map\n"
    );
    let map: serde_json::Value =
        serde_json::from_str(&ws.read("dist/lib/util.js.map")).unwrap();
    assert_eq!(map["file"], "util.js");
    assert_eq!(map["sources"][0], "../../src/lib/util.ts");
    assert_eq!(map["mappings"], ";AAAA;AACA");
    assert!(!ws.path().join("dist/skip.txt").exists());
}

#[tokio::test]
async fn test_shared_subtask_runs_once_across_combinators() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let shared = Task::from_fn("shared", move |run| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(run.files().fork())
        }
    });

    let left = Task::series("left", vec![shared.clone()]);
    let right = Task::series("right", vec![shared.clone()]);
    let all = Task::parallel("all", vec![left, right, shared]);

    all.run(&Run::new(dir("/project"))).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
