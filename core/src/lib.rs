pub mod api;
pub mod args;
pub mod build_log;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod plan;
pub mod runner;
pub mod tasks;
pub mod util;
