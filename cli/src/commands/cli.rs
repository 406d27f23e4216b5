use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "llvm-tasks", version, about = "Drive clang, ld.lld and llvm-ar build tasks")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// How the build log and task outputs are printed.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Config file to use instead of the default lookup.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Concurrent per-file compiles (0 = one per CPU).
    #[arg(long, global = true)]
    pub max_parallel: Option<usize>,

    /// Kill any tool that runs longer than this.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log the command lines without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile each input file to an object file.
    Compile(CompileArgs),
    /// Print the compile command lines without running them.
    WhatIf(CompileArgs),
    Link(LinkArgs),
    Archive(ArchiveArgs),
    /// Delete top-level files by extension.
    Clean(CleanArgs),
    /// Report the host OS family.
    OsFamily,
    /// Execute a TOML build plan.
    Run(RunPlanArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Directory holding the tool.
    #[arg(long)]
    pub tool_path: Option<String>,

    /// Tool file name, e.g. `clang-18`.
    #[arg(long)]
    pub tool_exe: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompileArgs {
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Intermediate directory for object files.
    #[arg(long, default_value = "")]
    pub int_dir: String,

    /// Preprocess, Parse, Assemble or Compile.
    #[arg(long)]
    pub stage: Option<String>,

    /// Explicit clang executable.
    #[arg(long)]
    pub clang: Option<String>,

    #[arg(long)]
    pub sysroot: Option<String>,

    #[arg(short = 'x', long)]
    pub language: Option<String>,

    #[arg(long)]
    pub stdlib: Option<String>,

    #[arg(long = "std")]
    pub language_standard: Option<String>,

    #[arg(long)]
    pub fpic: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(short = 'D', long = "define", action = clap::ArgAction::Append)]
    pub defines: Vec<String>,

    #[arg(short = 'I', long = "include", action = clap::ArgAction::Append)]
    pub includes: Vec<String>,

    /// Extra clang arguments, passed through verbatim.
    #[arg(long = "extra", allow_hyphen_values = true, action = clap::ArgAction::Append)]
    pub extra: Vec<String>,

    #[command(flatten)]
    pub tool: ToolArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LinkArgs {
    #[arg(required = true)]
    pub inputs: Vec<String>,

    #[arg(short, long)]
    pub output: Option<String>,

    /// Directory created before linking.
    #[arg(long)]
    pub out_dir: Option<String>,

    #[arg(short = 'L', long = "search-path", action = clap::ArgAction::Append)]
    pub search_paths: Vec<String>,

    #[arg(short = 'l', long = "library", action = clap::ArgAction::Append)]
    pub libraries: Vec<String>,

    #[arg(long)]
    pub shared: bool,

    #[arg(long)]
    pub dynamic_linker: Option<String>,

    #[arg(long)]
    pub hash_style: Option<String>,

    #[arg(long)]
    pub eh_frame_hdr: bool,

    #[arg(short = 'm', long)]
    pub emulation: Option<String>,

    #[arg(short = 'z', long = "z-option", action = clap::ArgAction::Append)]
    pub z_options: Vec<String>,

    /// Inputs placed before the search paths (crt1.o, crti.o, ...).
    #[arg(long = "header", action = clap::ArgAction::Append)]
    pub header_inputs: Vec<String>,

    /// Inputs placed after the libraries (crtn.o, ...).
    #[arg(long = "footer", action = clap::ArgAction::Append)]
    pub footer_inputs: Vec<String>,

    #[command(flatten)]
    pub tool: ToolArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ArchiveArgs {
    #[arg(short, long)]
    pub output: String,

    #[arg(required = true)]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub tool: ToolArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CleanArgs {
    #[arg(long = "dir", required = true, action = clap::ArgAction::Append)]
    pub directories: Vec<String>,

    /// Extension such as `o` or `*.o`; `*` deletes every file.
    #[arg(long = "ext", required = true, action = clap::ArgAction::Append)]
    pub extensions: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunPlanArgs {
    pub plan: PathBuf,
}
