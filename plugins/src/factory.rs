use std::sync::Arc;

use llvm_tasks_core::config::AppConfig;
use llvm_tasks_core::runner::ProcessRunner;

use crate::runner::ProcessRunnerPlugin;

pub fn build_runner(_cfg: &AppConfig) -> Arc<dyn ProcessRunner> {
    Arc::new(ProcessRunnerPlugin::new())
}
