//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `llvm_tasks_core::api` instead of reaching into internal modules.

pub use crate::args::{ArgKey, ArgStyle, ArgValue, ArgumentRegistry};
pub use crate::build_log::{BuildLog, LogMessage, Severity};
pub use crate::config::{
    apply_env_overrides, load_default, load_file, AppConfig, LoggingConfig, RunnerConfig,
    ToolchainConfig,
};
pub use crate::context::TaskContext;
pub use crate::error::{CliError, RunnerError, TaskError};
pub use crate::plan::{run_plan, BuildPlan, PlanReport, PlanTask, TaskReport};
pub use crate::runner::{
    run_command, CancelSignal, CommandInvocation, ProcessRunner, ProcessSession, RunCommandArgs,
    RunOptions, RunOutcome, RunStatus,
};
pub use crate::tasks::{
    create_task, ArchiveTask, CleanTask, CompileTask, LinkTask, OsFamilyTask, PropertyValue,
    Stage, Task, TaskKind, TaskOutputs, WhatIfCompileTask,
};
