use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default data directory: ~/.llvm-tasks
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".llvm-tasks"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.llvm-tasks/config.toml (highest)
    let user_config = get_data_dir()?.join("config.toml");

    // Priority 2: ./llvm-tasks.toml (current directory)
    let local_config = Path::new("llvm-tasks.toml");

    let mut cfg = if user_config.exists() {
        load_file(&user_config)?
    } else if local_config.exists() {
        load_file(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_file(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {} failed: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse {} failed: {e}", path.display()))?;
    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest).
pub fn apply_env_overrides(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("LLVM_TASKS_CLANG") {
        cfg.toolchain.clang = v;
    }
    if let Some(v) = non_empty("LLVM_TASKS_LLD") {
        cfg.toolchain.lld = v;
    }
    if let Some(v) = non_empty("LLVM_TASKS_AR") {
        cfg.toolchain.llvm_ar = v;
    }
    if let Some(v) = non_empty("LLVM_TASKS_TOOL_DIR") {
        cfg.toolchain.tool_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = non_empty("LLVM_TASKS_MAX_PARALLEL") {
        match v.trim().parse::<usize>() {
            Ok(n) => cfg.runner.max_parallel = n,
            Err(e) => tracing::warn!("ignoring LLVM_TASKS_MAX_PARALLEL={v}: {e}"),
        }
    }
}
