use std::path::{Path, PathBuf};

use crate::error::TaskError;

use super::PropertyValue;

/// `ToolPath` / `ToolExe` overrides for a task's executable.
#[derive(Debug, Clone, Default)]
pub struct ToolLocation {
    pub tool_path: Option<PathBuf>,
    pub tool_exe: Option<String>,
}

impl ToolLocation {
    pub fn handles(name: &str) -> bool {
        ["ToolPath", "ToolExe"]
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }

    /// Callers check [`ToolLocation::handles`] first; any other name is
    /// treated as `ToolExe`.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        if name.eq_ignore_ascii_case("ToolPath") {
            self.tool_path = value.into_path("ToolPath")?;
        } else {
            let exe = value.into_text("ToolExe")?;
            self.tool_exe = (!exe.is_empty()).then_some(exe);
        }
        Ok(())
    }

    /// `ToolPath` (or the configured tool directory) joined with the tool
    /// name; without either the name is looked up on `PATH`.
    pub fn resolve(&self, default_exe: &str, tool_dir: Option<&Path>) -> PathBuf {
        let exe = self.tool_exe.as_deref().unwrap_or(default_exe);
        match self.tool_path.as_deref().or(tool_dir) {
            Some(dir) => dir.join(exe),
            None => resolve_executable_path(exe),
        }
    }
}

/// Bare names are searched on `PATH`; anything with a directory part is used
/// as given. An unresolved name is returned unchanged and fails at spawn time.
pub fn resolve_executable_path(exe: &str) -> PathBuf {
    let path = Path::new(exe);
    if path.is_absolute() || path.components().count() > 1 {
        return path.to_path_buf();
    }

    match find_in_system_path(exe) {
        Some(found) => {
            tracing::debug!("Found in system PATH: {} -> {}", exe, found.display());
            found
        }
        None => {
            tracing::debug!("Not found in system PATH: {}", exe);
            path.to_path_buf()
        }
    }
}

fn find_in_system_path(cmd: &str) -> Option<PathBuf> {
    let path_env = std::env::var_os("PATH")?;

    for dir in std::env::split_paths(&path_env) {
        #[cfg(target_os = "windows")]
        {
            let candidate = if Path::new(cmd).extension().is_some() {
                dir.join(cmd)
            } else {
                dir.join(format!("{}.exe", cmd))
            };
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        #[cfg(not(target_os = "windows"))]
        {
            let candidate = dir.join(cmd);
            if candidate.is_file() && is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(not(target_os = "windows"))]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
