use std::path::{Path, PathBuf};

use serde::Serialize;

/// Exit code reported when the tool could not be started at all.
pub const LAUNCH_FAILED_EXIT_CODE: i32 = -1;
pub const CANCELLED_EXIT_CODE: i32 = 130;
pub const TIMED_OUT_EXIT_CODE: i32 = 124;

/// One external tool launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Created (recursively) before spawning when missing.
    pub output_dir: Option<PathBuf>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: Option<&Path>) -> Self {
        self.output_dir = dir
            .filter(|d| !d.as_os_str().is_empty())
            .map(Path::to_path_buf);
        self
    }

    /// Program and arguments joined by spaces; tokens containing whitespace are quoted.
    pub fn command_line(&self) -> String {
        let mut line = quote_token(&self.program.to_string_lossy());
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote_token(arg));
        }
        line
    }
}

fn quote_token(token: &str) -> String {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        format!("\"{}\"", token.replace('"', "\\\""))
    } else {
        token.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// The tool ran and exited with this code.
    Exited { code: i32 },
    /// Dry run: nothing was spawned.
    Skipped,
    /// The tool never started (not found, not executable, output dir failed).
    LaunchFailed { reason: String },
    Cancelled,
    TimedOut,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Exited { code } => write!(f, "exit code {code}"),
            RunStatus::Skipped => f.write_str("skipped"),
            RunStatus::LaunchFailed { reason } => write!(f, "launch failed: {reason}"),
            RunStatus::Cancelled => f.write_str("cancelled"),
            RunStatus::TimedOut => f.write_str("timed out"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub duration_ms: Option<u64>,
    pub stdout_tail: String,
    pub stderr_tail: String,
}

impl RunOutcome {
    pub fn skipped() -> Self {
        Self::bare(RunStatus::Skipped)
    }

    pub fn launch_failed(reason: impl Into<String>) -> Self {
        Self::bare(RunStatus::LaunchFailed {
            reason: reason.into(),
        })
    }

    pub fn cancelled() -> Self {
        Self::bare(RunStatus::Cancelled)
    }

    fn bare(status: RunStatus) -> Self {
        Self {
            status,
            duration_ms: None,
            stdout_tail: String::new(),
            stderr_tail: String::new(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match &self.status {
            RunStatus::Exited { code } => *code,
            RunStatus::Skipped => 0,
            RunStatus::LaunchFailed { .. } => LAUNCH_FAILED_EXIT_CODE,
            RunStatus::Cancelled => CANCELLED_EXIT_CODE,
            RunStatus::TimedOut => TIMED_OUT_EXIT_CODE,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_tokens_with_spaces() {
        let inv = CommandInvocation::new(
            "/usr/bin/clang",
            vec!["-c".into(), "-o".into(), "my dir/a.o".into(), "a.c".into()],
        );
        assert_eq!(inv.command_line(), "/usr/bin/clang -c -o \"my dir/a.o\" a.c");
    }

    #[test]
    fn launch_failure_is_distinct_from_a_failing_tool() {
        let launch = RunOutcome::launch_failed("not found");
        let ran = RunOutcome {
            status: RunStatus::Exited { code: 1 },
            ..RunOutcome::skipped()
        };
        assert_eq!(launch.exit_code(), LAUNCH_FAILED_EXIT_CODE);
        assert_eq!(ran.exit_code(), 1);
        assert_ne!(launch.status, ran.status);
        assert!(RunOutcome::skipped().success());
    }

    #[test]
    fn status_serializes_with_a_kind_tag() {
        let v = serde_json::to_value(RunStatus::Exited { code: 2 }).unwrap();
        assert_eq!(v, serde_json::json!({ "kind": "exited", "code": 2 }));
        let v = serde_json::to_value(RunStatus::TimedOut).unwrap();
        assert_eq!(v, serde_json::json!({ "kind": "timed_out" }));
    }

    #[test]
    fn empty_output_dir_is_dropped() {
        let inv = CommandInvocation::new("ar", vec![]).with_output_dir(Some(Path::new("")));
        assert_eq!(inv.output_dir, None);
    }
}
