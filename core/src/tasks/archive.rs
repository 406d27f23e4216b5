use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::arg_table;
use crate::args::{ArgStyle, ArgumentRegistry};
use crate::context::TaskContext;
use crate::error::TaskError;
use crate::runner::CommandInvocation;

use super::{PropertyValue, Task, TaskKind, ToolLocation};

const DEFAULT_MODIFIERS: &str = "rc";

arg_table! {
    /// `llvm-ar` takes everything positionally: modifiers, archive, members.
    pub enum ArchiveArg {
        Modifiers => ArgStyle::Positional,
        OutputFile => ArgStyle::Positional,
        InputFiles => ArgStyle::Positional,
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveTask {
    args: ArgumentRegistry<ArchiveArg>,
    tool: ToolLocation,
    dry_run: bool,
}

impl Default for ArchiveTask {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveTask {
    pub fn new() -> Self {
        let mut args = ArgumentRegistry::new();
        args.set(ArchiveArg::Modifiers, DEFAULT_MODIFIERS);
        Self {
            args,
            tool: ToolLocation::default(),
            dry_run: false,
        }
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.args.file(ArchiveArg::OutputFile)
    }

    pub fn set_output_file(&mut self, path: Option<PathBuf>) {
        self.args.set(ArchiveArg::OutputFile, path.unwrap_or_default());
    }

    pub fn input_files(&self) -> &[PathBuf] {
        self.args.files(ArchiveArg::InputFiles)
    }

    pub fn set_input_files(&mut self, files: Vec<PathBuf>) {
        self.args.set(ArchiveArg::InputFiles, files);
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn set_dry_run(&mut self, on: bool) {
        self.dry_run = on;
    }

    pub fn to_args(&self) -> Vec<String> {
        self.args.to_args()
    }

    pub fn invocation(&self, ctx: &TaskContext) -> Result<CommandInvocation, TaskError> {
        let output = self
            .output_file()
            .ok_or(TaskError::MissingProperty("OutputFile"))?;
        if !self.args.contains(ArchiveArg::InputFiles) {
            return Err(TaskError::MissingProperty("InputFiles"));
        }

        let program = self
            .tool
            .resolve(&ctx.toolchain().llvm_ar, ctx.toolchain().tool_dir.as_deref());
        Ok(CommandInvocation::new(program, self.to_args()).with_output_dir(output.parent()))
    }
}

#[async_trait]
impl Task for ArchiveTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Archive
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        if ToolLocation::handles(name) {
            return self.tool.set_property(name, value);
        }
        match name.to_ascii_lowercase().as_str() {
            "outputfile" => self.set_output_file(value.into_path("OutputFile")?),
            "inputfiles" => self.set_input_files(value.into_paths("InputFiles")?),
            "dryrun" => self.set_dry_run(value.into_bool("DryRun")?),
            _ => {
                return Err(TaskError::UnknownProperty {
                    task: "Archive",
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    async fn execute(&mut self, ctx: &TaskContext) -> bool {
        let invocation = match self.invocation(ctx) {
            Ok(inv) => inv,
            Err(e) => {
                ctx.log().error(e.to_string());
                return false;
            }
        };

        let outcome = ctx.run(&invocation, self.dry_run).await;
        if !outcome.success() {
            ctx.log().error(format!("Archive failed ({})", outcome.status));
        }
        outcome.success()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn modifiers_then_archive_then_members() {
        let mut task = ArchiveTask::new();
        task.set_property("InputFiles", "a.o;b.o".into()).unwrap();
        task.set_property("OutputFile", "lib/libfoo.a".into()).unwrap();
        assert_eq!(task.to_args(), vec!["rc", "lib/libfoo.a", "a.o", "b.o"]);
    }

    #[test]
    fn modifiers_are_not_a_property() {
        let mut task = ArchiveTask::new();
        assert!(task.set_property("Modifiers", "x".into()).is_err());
    }
}
