use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};

use llvm_tasks_core::runner::{
    CommandInvocation, ProcessRunner, ProcessSession, LAUNCH_FAILED_EXIT_CODE,
};

/// Spawns the tool as a real child process with both output streams piped.
pub struct ProcessRunnerPlugin {}

impl ProcessRunnerPlugin {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for ProcessRunnerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for ProcessRunnerPlugin {
    fn name(&self) -> &str {
        "process"
    }

    async fn spawn(&self, invocation: &CommandInvocation) -> Result<Box<dyn ProcessSession>> {
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("cannot start {}", invocation.program.display()))?;

        tracing::debug!(pid = ?child.id(), program = %invocation.program.display(), "spawned");
        Ok(Box::new(ChildSession { child }))
    }
}

struct ChildSession {
    child: Child,
}

#[async_trait]
impl ProcessSession for ChildSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn AsyncRead + Unpin + Send>)
    }

    async fn kill(&mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }

    async fn wait(&mut self) -> Result<i32> {
        let status = self.child.wait().await?;
        // No code means the process died from a signal.
        Ok(status.code().unwrap_or(LAUNCH_FAILED_EXIT_CODE))
    }
}
