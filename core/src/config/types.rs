use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "llvm_tasks=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Default tool names; tasks fall back to these when no executable property is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_clang")]
    pub clang: String,

    #[serde(default = "default_lld")]
    pub lld: String,

    #[serde(default = "default_llvm_ar")]
    pub llvm_ar: String,

    /// Directory holding the tools. Unset means "search PATH".
    #[serde(default)]
    pub tool_dir: Option<PathBuf>,
}

fn default_clang() -> String {
    "clang".to_string()
}

fn default_lld() -> String {
    "ld.lld".to_string()
}

fn default_llvm_ar() -> String {
    "llvm-ar".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            clang: default_clang(),
            lld: default_lld(),
            llvm_ar: default_llvm_ar(),
            tool_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Concurrent per-file compiles. `0` means one per CPU.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Kill a tool that runs longer than this. Unset waits forever.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default = "default_line_channel_capacity")]
    pub line_channel_capacity: usize,

    /// Bytes of recent stdout/stderr kept per invocation.
    #[serde(default = "default_capture_bytes")]
    pub capture_bytes: usize,
}

fn default_max_parallel() -> usize {
    1
}

fn default_line_channel_capacity() -> usize {
    1024
}

fn default_capture_bytes() -> usize {
    64 * 1024
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            timeout_ms: None,
            line_channel_capacity: default_line_channel_capacity(),
            capture_bytes: default_capture_bytes(),
        }
    }
}

impl RunnerConfig {
    pub fn effective_parallelism(&self) -> usize {
        match self.max_parallel {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
