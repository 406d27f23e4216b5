//! llvm-tasks CLI library, exposing modules for unit tests.

pub mod app;
pub mod commands;
