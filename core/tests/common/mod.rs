#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use llvm_tasks_core::api::{AppConfig, CommandInvocation, ProcessRunner, ProcessSession, TaskContext};

/// What a fake tool does once spawned.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Time until the process "exits"; used to exercise timeouts and cancellation.
    pub runtime: Option<Duration>,
}

impl Script {
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    pub fn hang() -> Self {
        Self {
            runtime: Some(Duration::from_secs(3600)),
            ..Self::default()
        }
    }
}

/// Records every spawn; picks the script of the first rule whose needle
/// appears in the arguments.
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<(String, Script)>,
    spawn_error: Option<String>,
    calls: Mutex<Vec<CommandInvocation>>,
    kills: Arc<AtomicUsize>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_arg(mut self, needle: &str, script: Script) -> Self {
        self.rules.push((needle.to_string(), script));
        self
    }

    pub fn always(self, script: Script) -> Self {
        self.on_arg("", script)
    }

    pub fn failing_spawn(mut self, reason: &str) -> Self {
        self.spawn_error = Some(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    fn script_for(&self, invocation: &CommandInvocation) -> Script {
        self.rules
            .iter()
            .find(|(needle, _)| invocation.args.iter().any(|a| a.contains(needle.as_str())))
            .map(|(_, s)| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    fn name(&self) -> &str {
        "fake"
    }

    async fn spawn(
        &self,
        invocation: &CommandInvocation,
    ) -> anyhow::Result<Box<dyn ProcessSession>> {
        if let Some(reason) = &self.spawn_error {
            anyhow::bail!("{}: {reason}", invocation.program.display());
        }
        self.calls.lock().unwrap().push(invocation.clone());
        let script = self.script_for(invocation);
        Ok(Box::new(FakeSession {
            stdout: Some(script.stdout.clone().into_bytes()),
            stderr: Some(script.stderr.clone().into_bytes()),
            script,
            kills: self.kills.clone(),
        }))
    }
}

struct FakeSession {
    script: Script,
    stdout: Option<Vec<u8>>,
    stderr: Option<Vec<u8>>,
    kills: Arc<AtomicUsize>,
}

#[async_trait]
impl ProcessSession for FakeSession {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.stdout
            .take()
            .map(|b| Box::new(std::io::Cursor::new(b)) as Box<dyn AsyncRead + Unpin + Send>)
    }

    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>> {
        self.stderr
            .take()
            .map(|b| Box::new(std::io::Cursor::new(b)) as Box<dyn AsyncRead + Unpin + Send>)
    }

    async fn kill(&mut self) -> anyhow::Result<()> {
        self.kills.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait(&mut self) -> anyhow::Result<i32> {
        if let Some(runtime) = self.script.runtime {
            tokio::time::sleep(runtime).await;
        }
        Ok(self.script.exit_code)
    }
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.toolchain.tool_dir = Some(PathBuf::from("/llvm/bin"));
    cfg
}

pub fn context(runner: Arc<FakeRunner>) -> TaskContext {
    TaskContext::new(test_config(), runner)
}

pub fn context_with(cfg: AppConfig, runner: Arc<FakeRunner>) -> TaskContext {
    TaskContext::new(cfg, runner)
}
