//! Turns subcommands into build plans, runs them and prints the result.
use std::io::Write;

use llvm_tasks_core::api as core_api;
use llvm_tasks_core::api::{BuildPlan, PlanReport, PlanTask, PropertyValue, Severity, TaskKind};

use crate::commands::cli::{
    ArchiveArgs, Args, CleanArgs, Commands, CompileArgs, LinkArgs, OutputFormat, ToolArgs,
};

fn list(items: &[String]) -> PropertyValue {
    PropertyValue::List(items.to_vec())
}

fn with_opt(task: PlanTask, name: &str, value: &Option<String>) -> PlanTask {
    match value {
        Some(v) => task.with_property(name, v.as_str()),
        None => task,
    }
}

fn with_tool(task: PlanTask, tool: &ToolArgs) -> PlanTask {
    let task = with_opt(task, "ToolPath", &tool.tool_path);
    with_opt(task, "ToolExe", &tool.tool_exe)
}

pub fn compile_task(kind: TaskKind, c: &CompileArgs, dry_run: bool) -> PlanTask {
    let mut task = PlanTask::new(kind)
        .with_property("InputFiles", list(&c.inputs))
        .with_property("IntDir", c.int_dir.as_str())
        .with_property("Verbose", c.verbose)
        .with_property("PositionIndependentCode", c.fpic)
        .with_property("PreprocessorDefinitions", list(&c.defines))
        .with_property("IncludeDirectories", list(&c.includes))
        .with_property("AdditionalOptions", list(&c.extra));
    task = with_opt(task, "Stage", &c.stage);
    task = with_opt(task, "ClangExecutable", &c.clang);
    task = with_opt(task, "SystemRoot", &c.sysroot);
    task = with_opt(task, "Language", &c.language);
    task = with_opt(task, "StandardLibrary", &c.stdlib);
    task = with_opt(task, "LanguageStandard", &c.language_standard);
    if kind == TaskKind::Compile {
        task = task.with_property("DryRun", dry_run);
    }
    with_tool(task, &c.tool)
}

pub fn link_task(l: &LinkArgs, dry_run: bool) -> PlanTask {
    let mut task = PlanTask::new(TaskKind::Link)
        .with_property("InputFiles", list(&l.inputs))
        .with_property("LibrarySearchPath", list(&l.search_paths))
        .with_property("LibraryNames", list(&l.libraries))
        .with_property("Shared", l.shared)
        .with_property("EhFrameHeader", l.eh_frame_hdr)
        .with_property("LinkerOptionExtensions", list(&l.z_options))
        .with_property("HeaderInputs", list(&l.header_inputs))
        .with_property("FooterInputs", list(&l.footer_inputs))
        .with_property("PrintOnly", dry_run);
    task = with_opt(task, "OutputFile", &l.output);
    task = with_opt(task, "OutDir", &l.out_dir);
    task = with_opt(task, "DynamicLinker", &l.dynamic_linker);
    task = with_opt(task, "HashStyle", &l.hash_style);
    task = with_opt(task, "TargetEmulation", &l.emulation);
    with_tool(task, &l.tool)
}

pub fn archive_task(a: &ArchiveArgs, dry_run: bool) -> PlanTask {
    let task = PlanTask::new(TaskKind::Archive)
        .with_property("OutputFile", a.output.as_str())
        .with_property("InputFiles", list(&a.inputs))
        .with_property("DryRun", dry_run);
    with_tool(task, &a.tool)
}

pub fn clean_task(c: &CleanArgs, dry_run: bool) -> PlanTask {
    PlanTask::new(TaskKind::Clean)
        .with_property("Directories", list(&c.directories))
        .with_property("Extensions", list(&c.extensions))
        .with_property("DryRun", dry_run)
}

pub fn plan_for(args: &Args) -> Result<BuildPlan, core_api::CliError> {
    let dry_run = args.dry_run;
    let task = match &args.command {
        Commands::Compile(c) => compile_task(TaskKind::Compile, c, dry_run),
        Commands::WhatIf(c) => compile_task(TaskKind::WhatIfCompile, c, dry_run),
        Commands::Link(l) => link_task(l, dry_run),
        Commands::Archive(a) => archive_task(a, dry_run),
        Commands::Clean(c) => clean_task(c, dry_run),
        Commands::OsFamily => PlanTask::new(TaskKind::OsFamily),
        Commands::Run(r) => return BuildPlan::load(&r.plan),
    };
    Ok(BuildPlan::single(task))
}

#[tracing::instrument(name = "cli.run_app", skip_all)]
pub async fn run_app(args: &Args, ctx: &core_api::TaskContext) -> Result<i32, core_api::CliError> {
    let plan = plan_for(args)?;
    let report = core_api::run_plan(&plan, ctx).await;
    print_report(&report, args.format)?;
    Ok(if report.success { 0 } else { 1 })
}

pub fn print_report(report: &PlanReport, format: OutputFormat) -> Result<(), core_api::CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let s = serde_json::to_string_pretty(report)
                .map_err(|e| core_api::CliError::Anyhow(e.into()))?;
            writeln!(out, "{s}")?;
        }
        OutputFormat::Text => {
            for msg in &report.messages {
                match msg.severity {
                    Severity::CommandLine => writeln!(out, "> {}", msg.text)?,
                    Severity::Info => writeln!(out, "{}", msg.text)?,
                    Severity::Warning => writeln!(out, "warning: {}", msg.text)?,
                    Severity::Error => writeln!(out, "error: {}", msg.text)?,
                }
            }
            for task in &report.tasks {
                let status = if task.success { "ok" } else { "FAILED" };
                writeln!(out, "[{}] {} ({})", status, task.name, task.kind)?;
                for (name, value) in &task.outputs {
                    writeln!(out, "    {name} = {}", render_value(value))?;
                }
            }
        }
    }
    Ok(())
}

fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Text(s) => s.clone(),
        PropertyValue::List(items) => items.join(";"),
    }
}
