use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::arg_table;
use crate::args::{ArgKey, ArgStyle, ArgumentRegistry};
use crate::context::TaskContext;
use crate::error::TaskError;
use crate::runner::CommandInvocation;

use super::{PropertyValue, Task, TaskKind, ToolLocation};

arg_table! {
    /// `ld.lld` options in command-line order: search paths before the
    /// inputs, `-l` after them, output last.
    pub enum LinkArg {
        LinkerOptionExtensions => ArgStyle::Separate("-z"),
        HashStyle => ArgStyle::Joined("--hash-style="),
        EhFrameHeader => ArgStyle::Flag("--eh-frame-hdr"),
        TargetEmulation => ArgStyle::Separate("-m"),
        Shared => ArgStyle::Flag("-shared"),
        DynamicLinker => ArgStyle::Separate("-dynamic-linker"),
        HeaderInputs => ArgStyle::Positional,
        LibrarySearchPath => ArgStyle::Joined("-L"),
        InputFiles => ArgStyle::Positional,
        LibraryNames => ArgStyle::Joined("-l"),
        FooterInputs => ArgStyle::Positional,
        OutputFile => ArgStyle::Separate("-o"),
    }
}

/// One `ld.lld` launch over all inputs.
#[derive(Debug, Clone, Default)]
pub struct LinkTask {
    args: ArgumentRegistry<LinkArg>,
    tool: ToolLocation,
    out_dir: Option<PathBuf>,
    print_only: bool,
}

impl LinkTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linker_option_extensions(&self) -> &[String] {
        self.args.texts(LinkArg::LinkerOptionExtensions)
    }

    pub fn set_linker_option_extensions(&mut self, exts: Vec<String>) {
        self.args.set(LinkArg::LinkerOptionExtensions, exts);
    }

    pub fn hash_style(&self) -> Option<&str> {
        self.args.text(LinkArg::HashStyle)
    }

    pub fn set_hash_style(&mut self, style: &str) {
        self.args.set(LinkArg::HashStyle, style);
    }

    pub fn eh_frame_header(&self) -> bool {
        self.args.switch(LinkArg::EhFrameHeader)
    }

    pub fn set_eh_frame_header(&mut self, on: bool) {
        self.args.set(LinkArg::EhFrameHeader, on);
    }

    pub fn target_emulation(&self) -> Option<&str> {
        self.args.text(LinkArg::TargetEmulation)
    }

    pub fn set_target_emulation(&mut self, emulation: &str) {
        self.args.set(LinkArg::TargetEmulation, emulation);
    }

    pub fn shared(&self) -> bool {
        self.args.switch(LinkArg::Shared)
    }

    pub fn set_shared(&mut self, on: bool) {
        self.args.set(LinkArg::Shared, on);
    }

    pub fn dynamic_linker(&self) -> Option<&Path> {
        self.args.file(LinkArg::DynamicLinker)
    }

    pub fn set_dynamic_linker(&mut self, path: Option<PathBuf>) {
        self.args.set(LinkArg::DynamicLinker, path.unwrap_or_default());
    }

    pub fn header_inputs(&self) -> &[PathBuf] {
        self.args.files(LinkArg::HeaderInputs)
    }

    pub fn set_header_inputs(&mut self, files: Vec<PathBuf>) {
        self.args.set(LinkArg::HeaderInputs, files);
    }

    pub fn library_search_path(&self) -> &[PathBuf] {
        self.args.files(LinkArg::LibrarySearchPath)
    }

    pub fn set_library_search_path(&mut self, dirs: Vec<PathBuf>) {
        self.args.set(LinkArg::LibrarySearchPath, dirs);
    }

    pub fn input_files(&self) -> &[PathBuf] {
        self.args.files(LinkArg::InputFiles)
    }

    pub fn set_input_files(&mut self, files: Vec<PathBuf>) {
        self.args.set(LinkArg::InputFiles, files);
    }

    pub fn library_names(&self) -> &[String] {
        self.args.texts(LinkArg::LibraryNames)
    }

    pub fn set_library_names(&mut self, names: Vec<String>) {
        self.args.set(LinkArg::LibraryNames, names);
    }

    pub fn footer_inputs(&self) -> &[PathBuf] {
        self.args.files(LinkArg::FooterInputs)
    }

    pub fn set_footer_inputs(&mut self, files: Vec<PathBuf>) {
        self.args.set(LinkArg::FooterInputs, files);
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.args.file(LinkArg::OutputFile)
    }

    pub fn set_output_file(&mut self, path: Option<PathBuf>) {
        self.args.set(LinkArg::OutputFile, path.unwrap_or_default());
    }

    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }

    pub fn set_out_dir(&mut self, dir: Option<PathBuf>) {
        self.out_dir = dir;
    }

    pub fn print_only(&self) -> bool {
        self.print_only
    }

    pub fn set_print_only(&mut self, on: bool) {
        self.print_only = on;
    }

    pub fn to_args(&self) -> Vec<String> {
        self.args.to_args()
    }

    pub fn invocation(&self, ctx: &TaskContext) -> Result<CommandInvocation, TaskError> {
        if !self.args.contains(LinkArg::InputFiles) {
            return Err(TaskError::MissingProperty("InputFiles"));
        }

        let program = self
            .tool
            .resolve(&ctx.toolchain().lld, ctx.toolchain().tool_dir.as_deref());
        let output_dir = self
            .out_dir
            .as_deref()
            .or_else(|| self.output_file().and_then(Path::parent));
        Ok(CommandInvocation::new(program, self.to_args()).with_output_dir(output_dir))
    }

    fn set_arg(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        let key = LinkArg::from_name(name).ok_or_else(|| TaskError::UnknownProperty {
            task: "Link",
            name: name.to_string(),
        })?;
        let prop = key.name();

        match key {
            LinkArg::LinkerOptionExtensions => {
                self.set_linker_option_extensions(value.into_list(prop)?)
            }
            LinkArg::HashStyle => self.set_hash_style(&value.into_text(prop)?),
            LinkArg::EhFrameHeader => self.set_eh_frame_header(value.into_bool(prop)?),
            LinkArg::TargetEmulation => self.set_target_emulation(&value.into_text(prop)?),
            LinkArg::Shared => self.set_shared(value.into_bool(prop)?),
            LinkArg::DynamicLinker => self.set_dynamic_linker(value.into_path(prop)?),
            LinkArg::HeaderInputs => self.set_header_inputs(value.into_paths(prop)?),
            LinkArg::LibrarySearchPath => self.set_library_search_path(value.into_paths(prop)?),
            LinkArg::InputFiles => self.set_input_files(value.into_paths(prop)?),
            LinkArg::LibraryNames => self.set_library_names(value.into_list(prop)?),
            LinkArg::FooterInputs => self.set_footer_inputs(value.into_paths(prop)?),
            LinkArg::OutputFile => self.set_output_file(value.into_path(prop)?),
        }
        Ok(())
    }
}

#[async_trait]
impl Task for LinkTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Link
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        if ToolLocation::handles(name) {
            return self.tool.set_property(name, value);
        }
        match name.to_ascii_lowercase().as_str() {
            "outdir" => self.set_out_dir(value.into_path("OutDir")?),
            "printonly" | "dryrun" => self.set_print_only(value.into_bool("PrintOnly")?),
            _ => return self.set_arg(name, value),
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

        let outcome = ctx.run(&invocation, self.print_only).await;
        if !outcome.success() {
            ctx.log().error(format!("Link failed ({})", outcome.status));
        }
        outcome.success()
    }
}
