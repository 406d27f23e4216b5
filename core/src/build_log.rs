//! Build log: the messages a task reports back to the build engine.
//!
//! Every message is also mirrored to `tracing`, so the CLI's subscriber sees
//! tool output alongside diagnostics.
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    CommandLine,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub severity: Severity,
    pub text: String,
    pub ts: String,
}

/// Cheap to clone; all clones append to the same list.
///
/// Each message is pushed whole under the lock, so output from concurrent
/// invocations never interleaves mid-line.
#[derive(Debug, Clone, Default)]
pub struct BuildLog {
    inner: Arc<Mutex<Vec<LogMessage>>>,
}

impl BuildLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(Severity::Info, text.into());
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.push(Severity::Warning, text.into());
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(Severity::Error, text.into());
    }

    pub fn command_line(&self, text: impl Into<String>) {
        self.push(Severity::CommandLine, text.into());
    }

    pub fn push(&self, severity: Severity, text: String) {
        match severity {
            Severity::Info => tracing::info!(target: "llvm_tasks::build", "{}", text),
            Severity::Warning => tracing::warn!(target: "llvm_tasks::build", "{}", text),
            Severity::Error => tracing::error!(target: "llvm_tasks::build", "{}", text),
            Severity::CommandLine => {
                tracing::info!(target: "llvm_tasks::build", command_line = true, "{}", text)
            }
        }

        let msg = LogMessage {
            severity,
            text,
            ts: chrono::Utc::now().to_rfc3339(),
        };
        self.lock().push(msg);
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.lock().clone()
    }

    /// Texts of every message with the given severity, in log order.
    pub fn texts(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|m| m.severity == severity)
            .map(|m| m.text.clone())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.lock().iter().any(|m| m.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drains the log, leaving it empty.
    pub fn take(&self) -> Vec<LogMessage> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogMessage>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_messages_by_severity() {
        let log = BuildLog::new();
        log.command_line("clang -c a.c");
        log.info("compiling");
        log.error("a.c:1: error");
        log.warning("careful");

        assert_eq!(log.len(), 4);
        assert_eq!(log.texts(Severity::Error), vec!["a.c:1: error"]);
        assert_eq!(log.texts(Severity::CommandLine), vec!["clang -c a.c"]);
        assert!(log.has_errors());
    }

    #[test]
    fn clones_share_one_list() {
        let log = BuildLog::new();
        let other = log.clone();
        other.info("from clone");
        assert_eq!(log.texts(Severity::Info), vec!["from clone"]);

        let drained = log.take();
        assert_eq!(drained.len(), 1);
        assert!(other.is_empty());
    }
}
