use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("plan error: {0}")]
    Plan(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Configuration errors raised while properties are bound or validated.
///
/// None of these ever reach a spawned process: a task that hits one fails
/// before building its first argument vector.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("required property '{0}' is missing or empty")]
    MissingProperty(&'static str),
    #[error("invalid value '{value}' for option '{option}' (expected one of: {expected})")]
    InvalidOption {
        option: &'static str,
        value: String,
        expected: String,
    },
    #[error("task '{task}' has no property named '{name}'")]
    UnknownProperty { task: &'static str, name: String },
    #[error("property '{name}' expects {expected}")]
    PropertyType {
        name: &'static str,
        expected: &'static str,
    },
    #[error("unknown task kind '{0}'")]
    UnknownTask(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("wait failed: {0}")]
    Wait(String),
}
