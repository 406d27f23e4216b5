use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::build_log::BuildLog;
use crate::error::RunnerError;
use crate::util::RingBytes;

use super::cancel::CancelSignal;
use super::io_pump::{self, LineStream, LineTap};
use super::traits::{ProcessRunner, ProcessSession};
use super::types::{CommandInvocation, RunOutcome, RunStatus};

/// Knobs for one launch; usually derived from `RunnerConfig`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    pub timeout: Option<Duration>,
    pub line_channel_capacity: usize,
    pub capture_bytes: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            timeout: None,
            line_channel_capacity: 1024,
            capture_bytes: 64 * 1024,
        }
    }
}

pub struct RunCommandArgs<'a> {
    pub runner: &'a dyn ProcessRunner,
    pub invocation: &'a CommandInvocation,
    pub log: &'a BuildLog,
    pub cancel: &'a CancelSignal,
    pub opts: &'a RunOptions,
}

/// Runs one tool to completion, streaming its output into the build log.
///
/// Never returns an error: launch problems are logged and reported as
/// `RunStatus::LaunchFailed` so the caller only has to look at the outcome.
#[tracing::instrument(
    name = "runner.run_command",
    skip_all,
    fields(runner = args.runner.name(), program = %args.invocation.program.display())
)]
pub async fn run_command(args: RunCommandArgs<'_>) -> RunOutcome {
    let RunCommandArgs {
        runner,
        invocation,
        log,
        cancel,
        opts,
    } = args;

    log.command_line(invocation.command_line());

    if opts.dry_run {
        log.warning("Dry run: command not executed.");
        return RunOutcome::skipped();
    }

    if cancel.is_cancelled() {
        log.warning(format!(
            "Cancelled before launching {}",
            invocation.program.display()
        ));
        return RunOutcome::cancelled();
    }

    match execute(runner, invocation, log, cancel, opts).await {
        Ok(outcome) => {
            tracing::debug!(
                status = ?outcome.status,
                duration_ms = outcome.duration_ms,
                "tool finished"
            );
            outcome
        }
        Err(e) => {
            tracing::error!(error.kind = "runner.launch", error.message = %e);
            log.error(format!(
                "Failed to launch {}: {e}",
                invocation.program.display()
            ));
            RunOutcome::launch_failed(e.to_string())
        }
    }
}

enum Interrupt {
    Cancelled,
    TimedOut,
}

async fn execute(
    runner: &dyn ProcessRunner,
    invocation: &CommandInvocation,
    log: &BuildLog,
    cancel: &CancelSignal,
    opts: &RunOptions,
) -> Result<RunOutcome, RunnerError> {
    // Some tools will not create the directory of their output file themselves.
    if let Some(dir) = invocation.output_dir.as_deref() {
        if !dir.exists() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| RunnerError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
    }

    let started_at = Instant::now();
    let mut session: Box<dyn ProcessSession> = runner
        .spawn(invocation)
        .await
        .map_err(|e| RunnerError::Spawn(format!("{e:#}")))?;

    let stdout = session
        .stdout()
        .ok_or_else(|| RunnerError::Spawn("no stdout".into()))?;
    let stderr = session
        .stderr()
        .ok_or_else(|| RunnerError::Spawn("no stderr".into()))?;

    let ring_out = RingBytes::new(opts.capture_bytes);
    let ring_err = RingBytes::new(opts.capture_bytes);

    let (line_tx, mut line_rx) = mpsc::channel::<LineTap>(opts.line_channel_capacity.max(1));
    let out_task =
        io_pump::spawn_pump(stdout, LineStream::Stdout, ring_out.clone(), line_tx.clone());
    let err_task = io_pump::spawn_pump(stderr, LineStream::Stderr, ring_err.clone(), line_tx);

    let (exit_status, interrupt) = {
        let wait_fut = session.wait();
        tokio::pin!(wait_fut);

        let deadline = async {
            match opts.timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let mut lines_open = true;
        let mut status = None;
        let mut interrupt = None;

        loop {
            tokio::select! {
                res = &mut wait_fut => {
                    status = Some(res);
                    break;
                }

                tap = line_rx.recv(), if lines_open => {
                    match tap {
                        Some(tap) => forward_line(log, tap),
                        None => lines_open = false,
                    }
                }

                _ = cancel.cancelled() => {
                    interrupt = Some(Interrupt::Cancelled);
                    break;
                }

                _ = &mut deadline => {
                    interrupt = Some(Interrupt::TimedOut);
                    break;
                }
            }
        }
        (status, interrupt)
    };

    if let Some(interrupt) = interrupt {
        if let Err(e) = session.kill().await {
            tracing::warn!(error.kind = "runner.kill", error.message = %e);
        }
        // Grandchildren may keep the pipes open; don't wait for EOF.
        out_task.abort();
        err_task.abort();

        let status = match interrupt {
            Interrupt::Cancelled => {
                log.warning(format!("{} was cancelled", invocation.program.display()));
                RunStatus::Cancelled
            }
            Interrupt::TimedOut => {
                log.error(format!(
                    "{} timed out after {} ms",
                    invocation.program.display(),
                    opts.timeout.map(|t| t.as_millis()).unwrap_or_default()
                ));
                RunStatus::TimedOut
            }
        };
        return Ok(RunOutcome {
            status,
            duration_ms: Some(started_at.elapsed().as_millis() as u64),
            stdout_tail: ring_out.to_string_lossy(),
            stderr_tail: ring_err.to_string_lossy(),
        });
    }

    // Both pumps hold a sender; the channel closes once they reach EOF.
    while let Some(tap) = line_rx.recv().await {
        forward_line(log, tap);
    }
    for task in [out_task, err_task] {
        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error.kind = "runner.stream", error.message = %e),
            Err(e) => tracing::warn!(error.kind = "runner.pump_join", error.message = %e),
        }
    }

    let code = match exit_status {
        Some(res) => res.map_err(|e| RunnerError::Wait(e.to_string()))?,
        None => return Err(RunnerError::Wait("process status unavailable".into())),
    };

    Ok(RunOutcome {
        status: RunStatus::Exited { code },
        duration_ms: Some(started_at.elapsed().as_millis() as u64),
        stdout_tail: ring_out.to_string_lossy(),
        stderr_tail: ring_err.to_string_lossy(),
    })
}

fn forward_line(log: &BuildLog, tap: LineTap) {
    if tap.line.is_empty() {
        return;
    }
    match tap.stream {
        LineStream::Stdout => log.info(tap.line),
        LineStream::Stderr => log.error(tap.line),
    }
}
