mod common;

use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{context, FakeRunner};
use llvm_tasks_core::api::{CleanTask, Severity, Task, TaskContext};

fn fixture(dir: &Path) {
    for name in ["a.o", "b.txt", "c"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
}

fn remaining(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn clean_task(dir: &Path, extensions: &str) -> CleanTask {
    let mut task = CleanTask::new();
    task.set_property("Directories", dir.display().to_string().into())
        .unwrap();
    task.set_property("Extensions", extensions.into()).unwrap();
    task
}

fn ctx() -> TaskContext {
    context(Arc::new(FakeRunner::new()))
}

#[tokio::test]
async fn unrelated_extensions_delete_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let ctx = ctx();

    let mut task = clean_task(dir.path(), "cpp;h");
    assert!(task.execute(&ctx).await);
    assert_eq!(remaining(dir.path()), vec!["a.o", "b.txt", "c"]);
    assert!(ctx.log().texts(Severity::Warning).is_empty());
}

#[tokio::test]
async fn star_deletes_everything_after_warning() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let ctx = ctx();

    let mut task = clean_task(dir.path(), "*");
    assert!(task.execute(&ctx).await);
    assert!(remaining(dir.path()).is_empty());

    let messages = ctx.log().messages();
    let warning = messages
        .iter()
        .position(|m| m.severity == Severity::Warning)
        .expect("warning logged");
    let first_delete = messages
        .iter()
        .position(|m| m.text.starts_with("Cleaning file"))
        .expect("deletions logged");
    assert!(warning < first_delete);
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.text.starts_with("Cleaning file"))
            .count(),
        3
    );
}

#[tokio::test]
async fn matching_extension_deletes_only_those_files() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("d.o"), b"x").unwrap();

    let ctx = ctx();
    let mut task = clean_task(dir.path(), "o");
    assert!(task.execute(&ctx).await);
    assert_eq!(remaining(dir.path()), vec!["b.txt", "c", "nested"]);
    assert!(dir.path().join("nested").join("d.o").exists());
}

#[tokio::test]
async fn dry_run_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let ctx = ctx();

    let mut task = clean_task(dir.path(), "*");
    task.set_property("DryRun", true.into()).unwrap();
    assert!(task.execute(&ctx).await);
    assert_eq!(remaining(dir.path()), vec!["a.o", "b.txt", "c"]);
    assert_eq!(
        ctx.log()
            .texts(Severity::Info)
            .iter()
            .filter(|t| t.starts_with("Would delete"))
            .count(),
        3
    );
}

#[tokio::test]
async fn missing_directory_stops_the_task() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let missing = dir.path().join("does-not-exist");

    let ctx = ctx();
    let mut task = CleanTask::new();
    task.set_property(
        "Directories",
        format!("{};{}", missing.display(), dir.path().display()).into(),
    )
    .unwrap();
    task.set_property("Extensions", "*".into()).unwrap();

    assert!(!task.execute(&ctx).await);
    // The second directory is never reached.
    assert_eq!(remaining(dir.path()), vec!["a.o", "b.txt", "c"]);
    assert!(ctx.log().texts(Severity::Error)[0].contains("does-not-exist"));
}

#[tokio::test]
async fn empty_extension_list_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx();
    let mut task = clean_task(dir.path(), ";");
    assert!(!task.execute(&ctx).await);
    assert!(ctx.log().texts(Severity::Error)[0].contains("Extensions"));
}
