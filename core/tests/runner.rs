mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::{FakeRunner, Script};
use llvm_tasks_core::api::{
    run_command, BuildLog, CancelSignal, CommandInvocation, RunCommandArgs, RunOptions,
    RunStatus, Severity,
};

fn invocation() -> CommandInvocation {
    CommandInvocation::new(
        "/llvm/bin/ld.lld",
        vec!["main.o".into(), "-o".into(), "app".into()],
    )
}

async fn run(
    runner: &FakeRunner,
    log: &BuildLog,
    cancel: &CancelSignal,
    opts: RunOptions,
) -> RunStatus {
    let inv = invocation();
    run_command(RunCommandArgs {
        runner,
        invocation: &inv,
        log,
        cancel,
        opts: &opts,
    })
    .await
    .status
}

#[tokio::test]
async fn streams_are_routed_by_severity() {
    let runner = FakeRunner::new().always(Script {
        exit_code: 0,
        stdout: "linking\n\nstep 2\n".into(),
        stderr: "warning: unused\n".into(),
        runtime: None,
    });
    let log = BuildLog::new();

    let status = run(&runner, &log, &CancelSignal::new(), RunOptions::default()).await;
    assert_eq!(status, RunStatus::Exited { code: 0 });
    assert_eq!(log.texts(Severity::Info), vec!["linking", "step 2"]);
    assert_eq!(log.texts(Severity::Error), vec!["warning: unused"]);
    assert_eq!(
        log.texts(Severity::CommandLine),
        vec!["/llvm/bin/ld.lld main.o -o app"]
    );
}

#[tokio::test]
async fn non_zero_exit_is_reported_as_is() {
    let runner = FakeRunner::new().always(Script::exit(3));
    let log = BuildLog::new();
    let status = run(&runner, &log, &CancelSignal::new(), RunOptions::default()).await;
    assert_eq!(status, RunStatus::Exited { code: 3 });
}

#[tokio::test]
async fn launch_failure_is_distinguishable() {
    let runner = FakeRunner::new().failing_spawn("No such file or directory");
    let log = BuildLog::new();

    let inv = invocation();
    let outcome = run_command(RunCommandArgs {
        runner: &runner,
        invocation: &inv,
        log: &log,
        cancel: &CancelSignal::new(),
        opts: &RunOptions::default(),
    })
    .await;

    assert!(matches!(outcome.status, RunStatus::LaunchFailed { .. }));
    assert_eq!(outcome.exit_code(), -1);
    assert!(log
        .texts(Severity::Error)
        .iter()
        .any(|e| e.contains("Failed to launch") && e.contains("No such file")));
}

#[tokio::test]
async fn slow_tool_is_killed_on_timeout() {
    let runner = FakeRunner::new().always(Script::hang());
    let log = BuildLog::new();
    let opts = RunOptions {
        timeout: Some(Duration::from_millis(50)),
        ..RunOptions::default()
    };

    let status = run(&runner, &log, &CancelSignal::new(), opts).await;
    assert_eq!(status, RunStatus::TimedOut);
    assert_eq!(runner.kills(), 1);
    assert!(log.has_errors());
}

#[tokio::test]
async fn cancel_kills_the_running_tool() {
    let runner = Arc::new(FakeRunner::new().always(Script::hang()));
    let log = BuildLog::new();
    let cancel = CancelSignal::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let status = tokio::time::timeout(
        Duration::from_secs(5),
        run(&runner, &log, &cancel, RunOptions::default()),
    )
    .await
    .expect("cancel should interrupt the wait");
    assert_eq!(status, RunStatus::Cancelled);
    assert_eq!(runner.kills(), 1);
}

#[tokio::test]
async fn dry_run_never_spawns() {
    let runner = FakeRunner::new();
    let log = BuildLog::new();
    let opts = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let status = run(&runner, &log, &CancelSignal::new(), opts).await;
    assert_eq!(status, RunStatus::Skipped);
    assert!(runner.calls().is_empty());
    assert_eq!(log.texts(Severity::Warning).len(), 1);
}
