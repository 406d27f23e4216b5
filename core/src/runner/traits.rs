use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::types::CommandInvocation;

/// A spawned tool whose output streams have not been taken yet.
#[async_trait]
pub trait ProcessSession: Send {
    fn stdout(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>>;
    fn stderr(&mut self) -> Option<Box<dyn AsyncRead + Unpin + Send>>;
    async fn kill(&mut self) -> anyhow::Result<()>;
    /// Resolves when the process exits; the raw exit code (`-1` when killed by a signal).
    async fn wait(&mut self) -> anyhow::Result<i32>;
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    fn name(&self) -> &str;
    async fn spawn(&self, invocation: &CommandInvocation)
        -> anyhow::Result<Box<dyn ProcessSession>>;
}
