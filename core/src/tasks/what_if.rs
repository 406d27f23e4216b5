use async_trait::async_trait;

use crate::context::TaskContext;
use crate::error::TaskError;

use super::{CompileTask, PropertyValue, Task, TaskKind, TaskOutputs};

/// Accepts every Compile property and logs the per-file command lines
/// without running anything.
#[derive(Debug, Clone, Default)]
pub struct WhatIfCompileTask {
    compile: CompileTask,
}

impl WhatIfCompileTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self) -> &CompileTask {
        &self.compile
    }

    pub fn compile_mut(&mut self) -> &mut CompileTask {
        &mut self.compile
    }
}

#[async_trait]
impl Task for WhatIfCompileTask {
    fn kind(&self) -> TaskKind {
        TaskKind::WhatIfCompile
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        self.compile.set_property(name, value)
    }

    async fn execute(&mut self, ctx: &TaskContext) -> bool {
        match self.compile.plan(ctx) {
            Ok(steps) => {
                for step in &steps {
                    ctx.log().command_line(step.invocation.command_line());
                }
                true
            }
            Err(e) => {
                ctx.log().error(e.to_string());
                false
            }
        }
    }

    fn outputs(&self) -> TaskOutputs {
        self.compile.outputs()
    }
}
