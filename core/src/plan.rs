//! Build plans: an ordered list of tasks with their property bags, read from
//! TOML and executed the way a build engine would drive the tasks.
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::build_log::LogMessage;
use crate::context::TaskContext;
use crate::error::{CliError, TaskError};
use crate::tasks::{create_task, PropertyValue, Task, TaskKind, TaskOutputs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(rename = "task", default)]
    pub tasks: Vec<PlanTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTask {
    pub kind: TaskKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl BuildPlan {
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Plan(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| CliError::Plan(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    pub fn single(task: PlanTask) -> Self {
        Self { tasks: vec![task] }
    }
}

impl PlanTask {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            name: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind.to_string())
    }

    /// Creates the task and binds every property; the first bad one wins.
    pub fn instantiate(&self) -> Result<Box<dyn Task>, TaskError> {
        let mut task = create_task(self.kind);
        for (name, value) in &self.properties {
            task.set_property(name, value.clone())?;
        }
        Ok(task)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub name: String,
    pub kind: TaskKind,
    pub success: bool,
    pub outputs: TaskOutputs,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub success: bool,
    pub tasks: Vec<TaskReport>,
    pub messages: Vec<LogMessage>,
}

/// Runs the tasks in order and stops at the first failure.
pub async fn run_plan(plan: &BuildPlan, ctx: &TaskContext) -> PlanReport {
    let mut reports = Vec::with_capacity(plan.tasks.len());
    let mut success = true;

    for entry in &plan.tasks {
        let name = entry.label();

        if ctx.cancel().is_cancelled() {
            ctx.log().warning(format!("Build cancelled before task '{name}'"));
            success = false;
            break;
        }

        let (ok, outputs) = match entry.instantiate() {
            Ok(mut task) => {
                let span = tracing::info_span!("task", name = %name, kind = %entry.kind);
                let ok = task.execute(ctx).instrument(span).await;
                (ok, task.outputs())
            }
            Err(e) => {
                ctx.log().error(format!("{name}: {e}"));
                (false, TaskOutputs::new())
            }
        };

        tracing::info!(task = %name, success = ok, "task finished");
        reports.push(TaskReport {
            name,
            kind: entry.kind,
            success: ok,
            outputs,
        });

        if !ok {
            success = false;
            break;
        }
    }

    PlanReport {
        success,
        tasks: reports,
        messages: ctx.log().messages(),
    }
}
