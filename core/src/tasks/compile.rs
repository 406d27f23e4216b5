use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::str::FromStr;

use async_trait::async_trait;

use crate::arg_table;
use crate::args::{ArgKey, ArgStyle, ArgumentRegistry};
use crate::context::TaskContext;
use crate::error::TaskError;
use crate::executor::run_bounded;
use crate::runner::CommandInvocation;

use super::tool::resolve_executable_path;
use super::{PropertyValue, Task, TaskKind, TaskOutputs, ToolLocation};

const STAGE_FLAGS: &[(&str, &str)] = &[
    ("Preprocess", "-E"),
    ("Parse", "-fsyntax-only"),
    ("Assemble", "-S"),
    ("Compile", "-c"),
];

/// How far clang takes each input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    Preprocess,
    Parse,
    Assemble,
    #[default]
    Compile,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Preprocess => "Preprocess",
            Stage::Parse => "Parse",
            Stage::Assemble => "Assemble",
            Stage::Compile => "Compile",
        }
    }
}

impl FromStr for Stage {
    type Err = TaskError;

    /// Keys match the stage table exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Preprocess" => Ok(Stage::Preprocess),
            "Parse" => Ok(Stage::Parse),
            "Assemble" => Ok(Stage::Assemble),
            "Compile" => Ok(Stage::Compile),
            _ => Err(TaskError::InvalidOption {
                option: "Stage",
                value: s.to_string(),
                expected: STAGE_FLAGS
                    .iter()
                    .map(|(key, _)| *key)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

arg_table! {
    /// Clang options in command-line order. `ObjectFile` and `SourceFile` are
    /// filled in per input and are not settable as properties.
    pub enum CompileArg {
        Stage => ArgStyle::Lookup(STAGE_FLAGS),
        Verbose => ArgStyle::Flag("-v"),
        SystemRoot => ArgStyle::Separate("-isysroot"),
        Language => ArgStyle::Separate("-x"),
        StandardLibrary => ArgStyle::Joined("-stdlib="),
        LanguageStandard => ArgStyle::Joined("-std="),
        PositionIndependentCode => ArgStyle::Flag("-fPIC"),
        PreprocessorDefinitions => ArgStyle::Joined("-D"),
        IncludeDirectories => ArgStyle::Joined("-I"),
        AdditionalOptions => ArgStyle::Positional,
        ObjectFile => ArgStyle::Separate("-o"),
        SourceFile => ArgStyle::Positional,
    }
}

/// Object file for `source` under `int_dir`: the source path with its
/// extension replaced by `.o`, appended to the intermediate directory.
pub fn object_path(int_dir: &str, source: &Path) -> PathBuf {
    let object = source.with_extension("o");
    if int_dir.is_empty() {
        return object;
    }
    let sep = if int_dir.ends_with(['/', '\\']) {
        String::new()
    } else {
        MAIN_SEPARATOR.to_string()
    };
    PathBuf::from(format!("{int_dir}{sep}{}", object.display()))
}

/// One planned clang launch.
#[derive(Debug, Clone)]
pub struct CompileStep {
    pub source: PathBuf,
    pub object: PathBuf,
    pub invocation: CommandInvocation,
}

/// Runs clang once per input file.
#[derive(Debug, Clone)]
pub struct CompileTask {
    args: ArgumentRegistry<CompileArg>,
    tool: ToolLocation,
    clang_executable: Option<PathBuf>,
    input_files: Vec<PathBuf>,
    int_dir: String,
    dry_run: bool,
}

impl Default for CompileTask {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileTask {
    pub fn new() -> Self {
        let mut task = Self {
            args: ArgumentRegistry::new(),
            tool: ToolLocation::default(),
            clang_executable: None,
            input_files: Vec::new(),
            int_dir: String::new(),
            dry_run: false,
        };
        task.set_stage(Stage::Compile);
        task
    }

    pub fn stage(&self) -> Stage {
        self.args
            .text(CompileArg::Stage)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.args.set(CompileArg::Stage, stage.name());
    }

    /// An empty name restores the default stage.
    pub fn set_stage_name(&mut self, name: &str) -> Result<(), TaskError> {
        let stage = if name.is_empty() {
            Stage::default()
        } else {
            name.parse()?
        };
        self.set_stage(stage);
        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.args.switch(CompileArg::Verbose)
    }

    pub fn set_verbose(&mut self, on: bool) {
        self.args.set(CompileArg::Verbose, on);
    }

    pub fn system_root(&self) -> Option<&Path> {
        self.args.file(CompileArg::SystemRoot)
    }

    pub fn set_system_root(&mut self, dir: Option<PathBuf>) {
        self.args
            .set(CompileArg::SystemRoot, dir.unwrap_or_default());
    }

    pub fn language(&self) -> Option<&str> {
        self.args.text(CompileArg::Language)
    }

    pub fn set_language(&mut self, lang: &str) {
        self.args.set(CompileArg::Language, lang);
    }

    pub fn standard_library(&self) -> Option<&str> {
        self.args.text(CompileArg::StandardLibrary)
    }

    pub fn set_standard_library(&mut self, lib: &str) {
        self.args.set(CompileArg::StandardLibrary, lib);
    }

    pub fn language_standard(&self) -> Option<&str> {
        self.args.text(CompileArg::LanguageStandard)
    }

    pub fn set_language_standard(&mut self, std: &str) {
        self.args.set(CompileArg::LanguageStandard, std);
    }

    pub fn position_independent_code(&self) -> bool {
        self.args.switch(CompileArg::PositionIndependentCode)
    }

    pub fn set_position_independent_code(&mut self, on: bool) {
        self.args.set(CompileArg::PositionIndependentCode, on);
    }

    pub fn preprocessor_definitions(&self) -> &[String] {
        self.args.texts(CompileArg::PreprocessorDefinitions)
    }

    pub fn set_preprocessor_definitions(&mut self, defs: Vec<String>) {
        self.args.set(CompileArg::PreprocessorDefinitions, defs);
    }

    pub fn include_directories(&self) -> &[PathBuf] {
        self.args.files(CompileArg::IncludeDirectories)
    }

    pub fn set_include_directories(&mut self, dirs: Vec<PathBuf>) {
        self.args.set(CompileArg::IncludeDirectories, dirs);
    }

    pub fn additional_options(&self) -> &[String] {
        self.args.texts(CompileArg::AdditionalOptions)
    }

    pub fn set_additional_options(&mut self, opts: Vec<String>) {
        self.args.set(CompileArg::AdditionalOptions, opts);
    }

    pub fn input_files(&self) -> &[PathBuf] {
        &self.input_files
    }

    pub fn set_input_files(&mut self, files: Vec<PathBuf>) {
        self.input_files = files;
    }

    pub fn int_dir(&self) -> &str {
        &self.int_dir
    }

    pub fn set_int_dir(&mut self, dir: impl Into<String>) {
        self.int_dir = dir.into();
    }

    pub fn clang_executable(&self) -> Option<&Path> {
        self.clang_executable.as_deref()
    }

    pub fn set_clang_executable(&mut self, exe: Option<PathBuf>) {
        self.clang_executable = exe;
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn set_dry_run(&mut self, on: bool) {
        self.dry_run = on;
    }

    /// Object files for every input, whether or not it compiled.
    pub fn object_files(&self) -> Vec<PathBuf> {
        self.input_files
            .iter()
            .map(|src| object_path(&self.int_dir, src))
            .collect()
    }

    pub fn program(&self, ctx: &TaskContext) -> PathBuf {
        match &self.clang_executable {
            Some(exe) => resolve_executable_path(&exe.to_string_lossy()),
            None => self.tool.resolve(
                &ctx.toolchain().clang,
                ctx.toolchain().tool_dir.as_deref(),
            ),
        }
    }

    /// Validates the configuration and builds one launch per input file.
    pub fn plan(&self, ctx: &TaskContext) -> Result<Vec<CompileStep>, TaskError> {
        if self.input_files.is_empty() {
            return Err(TaskError::MissingProperty("InputFiles"));
        }

        let program = self.program(ctx);
        let steps = self
            .input_files
            .iter()
            .map(|source| {
                let object = object_path(&self.int_dir, source);
                let mut args = self.args.clone();
                args.set(CompileArg::ObjectFile, object.clone());
                args.set(CompileArg::SourceFile, source.clone());

                let invocation = CommandInvocation::new(program.clone(), args.to_args())
                    .with_output_dir(object.parent());
                CompileStep {
                    source: source.clone(),
                    object,
                    invocation,
                }
            })
            .collect();
        Ok(steps)
    }

    fn set_arg(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        let key = CompileArg::from_name(name)
            .filter(|k| !matches!(k, CompileArg::ObjectFile | CompileArg::SourceFile))
            .ok_or_else(|| TaskError::UnknownProperty {
                task: "Compile",
                name: name.to_string(),
            })?;
        let prop = key.name();

        match key {
            CompileArg::Stage => self.set_stage_name(&value.into_text(prop)?)?,
            CompileArg::Verbose => self.set_verbose(value.into_bool(prop)?),
            CompileArg::SystemRoot => self.set_system_root(value.into_path(prop)?),
            CompileArg::Language => self.set_language(&value.into_text(prop)?),
            CompileArg::StandardLibrary => self.set_standard_library(&value.into_text(prop)?),
            CompileArg::LanguageStandard => self.set_language_standard(&value.into_text(prop)?),
            CompileArg::PositionIndependentCode => {
                self.set_position_independent_code(value.into_bool(prop)?)
            }
            CompileArg::PreprocessorDefinitions => {
                self.set_preprocessor_definitions(value.into_list(prop)?)
            }
            CompileArg::IncludeDirectories => self.set_include_directories(value.into_paths(prop)?),
            // Verbatim tokens; a single string may carry several.
            CompileArg::AdditionalOptions => self.set_additional_options(
                value
                    .into_list(prop)?
                    .iter()
                    .flat_map(|s| s.split_whitespace())
                    .map(str::to_string)
                    .collect(),
            ),
            CompileArg::ObjectFile | CompileArg::SourceFile => {}
        }
        Ok(())
    }
}

#[async_trait]
impl Task for CompileTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Compile
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        if ToolLocation::handles(name) {
            return self.tool.set_property(name, value);
        }
        match name.to_ascii_lowercase().as_str() {
            "clangexecutable" => self.set_clang_executable(value.into_path("ClangExecutable")?),
            "inputfiles" => self.set_input_files(value.into_paths("InputFiles")?),
            "intdir" => self.set_int_dir(value.into_text("IntDir")?),
            "dryrun" => self.set_dry_run(value.into_bool("DryRun")?),
            _ => return self.set_arg(name, value),
        }
        Ok(())
    }

    async fn execute(&mut self, ctx: &TaskContext) -> bool {
        let steps = match self.plan(ctx) {
            Ok(steps) => steps,
            Err(e) => {
                ctx.log().error(e.to_string());
                return false;
            }
        };

        let total = steps.len();
        let dry_run = self.dry_run;
        tracing::info!(files = total, max_parallel = ctx.max_parallel(), "compile started");

        let results = run_bounded(steps, ctx.max_parallel(), move |step| async move {
            let outcome = ctx.run(&step.invocation, dry_run).await;
            if !outcome.success() {
                ctx.log().error(format!(
                    "Compiling {} failed ({})",
                    step.source.display(),
                    outcome.status
                ));
            }
            outcome.success()
        })
        .await;

        let failed = results.iter().filter(|ok| !**ok).count();
        if failed > 0 {
            ctx.log()
                .error(format!("{failed} of {total} source file(s) failed to compile"));
        }
        failed == 0
    }

    fn outputs(&self) -> TaskOutputs {
        let mut out = TaskOutputs::new();
        out.insert(
            "ObjectFiles".to_string(),
            PropertyValue::from(self.object_files().as_slice()),
        );
        out
    }
}
