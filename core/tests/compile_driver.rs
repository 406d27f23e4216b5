mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{context, context_with, test_config, FakeRunner, Script};
use llvm_tasks_core::api::{
    CompileTask, PropertyValue, Severity, Task, TaskError, WhatIfCompileTask,
};

fn compile_task(inputs: &str, int_dir: &str) -> CompileTask {
    let mut task = CompileTask::new();
    task.set_property("InputFiles", inputs.into()).unwrap();
    task.set_property("IntDir", int_dir.into()).unwrap();
    task
}

#[tokio::test]
async fn one_launch_per_file_with_output_before_input() {
    let runner = Arc::new(FakeRunner::new());
    let ctx = context(runner.clone());

    let mut task = compile_task("foo/bar.cpp", "build/");
    task.set_property("LanguageStandard", "c++17".into()).unwrap();
    task.set_property("DryRun", false.into()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    task.set_property("IntDir", format!("{}/", dir.path().display()).into())
        .unwrap();

    assert!(task.execute(&ctx).await);

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, std::path::PathBuf::from("/llvm/bin/clang"));
    let object = format!("{}/foo/bar.o", dir.path().display());
    assert_eq!(
        calls[0].args,
        vec!["-c", "-std=c++17", "-o", object.as_str(), "foo/bar.cpp"]
    );
    // Output directory is created before the tool runs.
    assert!(dir.path().join("foo").is_dir());
}

#[tokio::test]
async fn failing_file_does_not_stop_the_others() {
    let runner = Arc::new(FakeRunner::new().on_arg("b.c", Script::exit(1)));
    let ctx = context(runner.clone());
    let dir = tempfile::tempdir().unwrap();
    let int_dir = format!("{}/", dir.path().display());

    let mut task = compile_task("a.c;b.c;c.c", &int_dir);
    assert!(!task.execute(&ctx).await);

    let sources: Vec<String> = runner
        .calls()
        .iter()
        .map(|c| c.args.last().cloned().unwrap_or_default())
        .collect();
    assert_eq!(sources, vec!["a.c", "b.c", "c.c"]);

    let objects = match task.outputs().remove("ObjectFiles") {
        Some(PropertyValue::List(items)) => items,
        other => panic!("unexpected ObjectFiles output: {other:?}"),
    };
    assert_eq!(objects.len(), 3);

    let errors = ctx.log().texts(Severity::Error);
    assert!(errors.iter().any(|e| e.contains("b.c") && e.contains("exit code 1")));
    assert!(errors.iter().any(|e| e.contains("1 of 3")));
}

#[tokio::test]
async fn dry_run_spawns_nothing_and_touches_no_files() {
    let runner = Arc::new(FakeRunner::new());
    let ctx = context(runner.clone());
    let dir = tempfile::tempdir().unwrap();
    let int_dir = dir.path().join("obj");

    let mut task = compile_task("src/main.c", &format!("{}/", int_dir.display()));
    task.set_property("DryRun", "true".into()).unwrap();

    assert!(task.execute(&ctx).await);
    assert!(runner.calls().is_empty());
    assert!(!int_dir.exists());

    let expected = format!(
        "/llvm/bin/clang -c -o {}/src/main.o src/main.c",
        int_dir.display()
    );
    assert_eq!(ctx.log().texts(Severity::CommandLine), vec![expected]);
}

#[test]
fn invalid_stage_is_rejected_before_any_launch() {
    let mut task = CompileTask::new();
    let err = task.set_property("Stage", "Link".into()).unwrap_err();
    match err {
        TaskError::InvalidOption {
            option, expected, ..
        } => {
            assert_eq!(option, "Stage");
            assert_eq!(expected, "Preprocess, Parse, Assemble, Compile");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_inputs_fail_without_spawning() {
    let runner = Arc::new(FakeRunner::new());
    let ctx = context(runner.clone());

    let mut task = CompileTask::new();
    assert!(!task.execute(&ctx).await);
    assert!(runner.calls().is_empty());
    assert!(ctx.log().has_errors());
}

#[tokio::test]
async fn cancelled_build_launches_nothing() {
    let runner = Arc::new(FakeRunner::new());
    let ctx = context(runner.clone());
    ctx.cancel().cancel();

    let dir = tempfile::tempdir().unwrap();
    let mut task = compile_task("a.c;b.c", &format!("{}/", dir.path().display()));
    assert!(!task.execute(&ctx).await);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn parallel_compile_attempts_every_file() {
    let runner = Arc::new(FakeRunner::new().on_arg("e.c", Script::exit(2)));
    let mut cfg = test_config();
    cfg.runner.max_parallel = 4;
    let ctx = context_with(cfg, runner.clone());
    let dir = tempfile::tempdir().unwrap();

    let int_dir = format!("{}/", dir.path().display());
    let mut task = compile_task("a.c;b.c;c.c;d.c;e.c;f.c", &int_dir);
    assert!(!task.execute(&ctx).await);
    assert_eq!(runner.calls().len(), 6);
    assert_eq!(ctx.log().texts(Severity::CommandLine).len(), 6);
}

#[tokio::test]
async fn what_if_logs_command_lines_only() {
    let runner = Arc::new(FakeRunner::new());
    let ctx = context(runner.clone());

    let mut task = WhatIfCompileTask::new();
    task.set_property("InputFiles", "a.c;lib/b.c".into()).unwrap();
    task.set_property("IntDir", "obj/".into()).unwrap();
    task.set_property("Stage", "Preprocess".into()).unwrap();

    assert!(task.execute(&ctx).await);
    assert!(runner.calls().is_empty());
    assert_eq!(
        ctx.log().texts(Severity::CommandLine),
        vec![
            "/llvm/bin/clang -E -o obj/a.o a.c",
            "/llvm/bin/clang -E -o obj/lib/b.o lib/b.c",
        ]
    );
    assert!(ctx.log().texts(Severity::Warning).is_empty());
}
