//! Task drivers: property bag in, `bool` plus build log out.
//!
//! ```text
//! set_property(name, value) ──► façade setter ──► ArgumentRegistry
//!                                                        │ to_args()
//! execute(ctx) ──► validate ──► CommandInvocation ──► run_command ──► bool
//! ```

mod archive;
mod clean;
mod compile;
mod link;
mod os_family;
mod property;
mod tool;
mod what_if;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::TaskContext;
use crate::error::TaskError;

pub use archive::{ArchiveArg, ArchiveTask};
pub use clean::CleanTask;
pub use compile::{object_path, CompileArg, CompileStep, CompileTask, Stage};
pub use link::{LinkArg, LinkTask};
pub use os_family::{current_os_family, OsFamilyTask};
pub use property::{split_items, PropertyValue};
pub use tool::{resolve_executable_path, ToolLocation};
pub use what_if::WhatIfCompileTask;

/// Output properties a task exposes after it ran.
pub type TaskOutputs = BTreeMap<String, PropertyValue>;

/// The engine-facing surface of every driver.
///
/// `execute` never returns an error: configuration problems, launch failures
/// and failing tools all end up as `false` plus messages in the build log.
#[async_trait]
pub trait Task: Send {
    fn kind(&self) -> TaskKind;

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError>;

    async fn execute(&mut self, ctx: &TaskContext) -> bool;

    fn outputs(&self) -> TaskOutputs {
        TaskOutputs::new()
    }
}

/// Plans may spell a kind as `what-if-compile`, `WhatIfCompile` or `WhatIfCompileTask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum TaskKind {
    Compile,
    WhatIfCompile,
    Link,
    Archive,
    Clean,
    OsFamily,
}

impl TaskKind {
    pub const ALL: &'static [TaskKind] = &[
        TaskKind::Compile,
        TaskKind::WhatIfCompile,
        TaskKind::Link,
        TaskKind::Archive,
        TaskKind::Clean,
        TaskKind::OsFamily,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Compile => "compile",
            TaskKind::WhatIfCompile => "what-if-compile",
            TaskKind::Link => "link",
            TaskKind::Archive => "archive",
            TaskKind::Clean => "clean",
            TaskKind::OsFamily => "os-family",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        let folded = folded.strip_suffix("task").unwrap_or(&folded);

        TaskKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().replace('-', "") == folded)
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

impl TryFrom<String> for TaskKind {
    type Error = TaskError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

pub fn create_task(kind: TaskKind) -> Box<dyn Task> {
    match kind {
        TaskKind::Compile => Box::new(CompileTask::new()),
        TaskKind::WhatIfCompile => Box::new(WhatIfCompileTask::new()),
        TaskKind::Link => Box::new(LinkTask::new()),
        TaskKind::Archive => Box::new(ArchiveTask::new()),
        TaskKind::Clean => Box::new(CleanTask::new()),
        TaskKind::OsFamily => Box::new(OsFamilyTask::new()),
    }
}
