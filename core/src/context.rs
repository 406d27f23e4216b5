use std::sync::Arc;

use crate::build_log::BuildLog;
use crate::config::{AppConfig, ToolchainConfig};
use crate::runner::{
    run_command, CancelSignal, CommandInvocation, ProcessRunner, RunCommandArgs, RunOptions,
    RunOutcome,
};

/// Everything a task needs from its host while it executes.
#[derive(Clone)]
pub struct TaskContext {
    cfg: AppConfig,
    runner: Arc<dyn ProcessRunner>,
    log: BuildLog,
    cancel: CancelSignal,
}

impl TaskContext {
    pub fn new(cfg: AppConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            cfg,
            runner,
            log: BuildLog::new(),
            cancel: CancelSignal::new(),
        }
    }

    pub fn with_log(mut self, log: BuildLog) -> Self {
        self.log = log;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.cfg.toolchain
    }

    pub fn log(&self) -> &BuildLog {
        &self.log
    }

    pub fn cancel(&self) -> &CancelSignal {
        &self.cancel
    }

    pub fn max_parallel(&self) -> usize {
        self.cfg.runner.effective_parallelism()
    }

    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        RunOptions {
            dry_run,
            timeout: self.cfg.runner.timeout(),
            line_channel_capacity: self.cfg.runner.line_channel_capacity,
            capture_bytes: self.cfg.runner.capture_bytes,
        }
    }

    pub async fn run(&self, invocation: &CommandInvocation, dry_run: bool) -> RunOutcome {
        let opts = self.run_options(dry_run);
        run_command(RunCommandArgs {
            runner: self.runner.as_ref(),
            invocation,
            log: &self.log,
            cancel: &self.cancel,
            opts: &opts,
        })
        .await
    }
}
