use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use glob::Pattern;

use crate::context::TaskContext;
use crate::error::TaskError;

use super::{PropertyValue, Task, TaskKind};

const MATCH_ALL: &str = "*";

/// Deletes top-level files by extension. Spawns nothing.
#[derive(Debug, Clone, Default)]
pub struct CleanTask {
    directories: Vec<PathBuf>,
    extensions: Vec<String>,
    dry_run: bool,
}

impl CleanTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn set_directories(&mut self, dirs: Vec<PathBuf>) {
        self.directories = dirs;
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn set_extensions(&mut self, exts: Vec<String>) {
        self.extensions = exts;
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn set_dry_run(&mut self, on: bool) {
        self.dry_run = on;
    }

    pub fn matches_everything(&self) -> bool {
        self.extensions.iter().any(|e| e == MATCH_ALL)
    }

    /// File-name globs: `o`, `.o` and `*.o` all mean `*.o`.
    pub fn file_patterns(&self) -> Vec<String> {
        if self.matches_everything() {
            return vec![MATCH_ALL.to_string()];
        }
        self.extensions
            .iter()
            .map(|ext| {
                if ext.starts_with("*.") {
                    ext.clone()
                } else {
                    format!("*.{}", ext.trim_start_matches('.'))
                }
            })
            .collect()
    }

    fn validate(&self) -> Result<(), TaskError> {
        if self.directories.is_empty() {
            return Err(TaskError::MissingProperty("Directories"));
        }
        if self.extensions.is_empty() {
            return Err(TaskError::MissingProperty("Extensions"));
        }
        Ok(())
    }

    fn matching_files(dir: &Path, patterns: &[String]) -> Result<BTreeSet<PathBuf>, TaskError> {
        let base = Pattern::escape(&dir.to_string_lossy());
        let mut found = BTreeSet::new();

        for pattern in patterns {
            let full = format!("{base}/{pattern}");
            let paths = glob::glob(&full).map_err(|e| TaskError::InvalidOption {
                option: "Extensions",
                value: pattern.clone(),
                expected: format!("a valid file-name glob ({e})"),
            })?;
            for entry in paths {
                let path = entry.map_err(|e| TaskError::Io(e.into()))?;
                if path.is_file() {
                    found.insert(path);
                }
            }
        }
        Ok(found)
    }

    fn clean_directory(
        &self,
        dir: &Path,
        patterns: &[String],
        ctx: &TaskContext,
    ) -> Result<(), TaskError> {
        if !dir.is_dir() {
            return Err(TaskError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Directory does not exist: {}", dir.display()),
            )));
        }

        for path in Self::matching_files(dir, patterns)? {
            if self.dry_run {
                ctx.log().info(format!("Would delete file: {}", path.display()));
                continue;
            }
            ctx.log().info(format!("Cleaning file: {}", path.display()));
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Task for CleanTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Clean
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), TaskError> {
        match name.to_ascii_lowercase().as_str() {
            "directories" => self.set_directories(value.into_paths("Directories")?),
            "extensions" => self.set_extensions(value.into_list("Extensions")?),
            "dryrun" => self.set_dry_run(value.into_bool("DryRun")?),
            _ => {
                return Err(TaskError::UnknownProperty {
                    task: "Clean",
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }

    async fn execute(&mut self, ctx: &TaskContext) -> bool {
        if let Err(e) = self.validate() {
            ctx.log().error(e.to_string());
            return false;
        }

        if self.matches_everything() {
            ctx.log().warning(
                "You selected * as extension, which will delete all the files in the selected directories.",
            );
        }

        let patterns = self.file_patterns();
        for dir in &self.directories {
            if let Err(e) = self.clean_directory(dir, &patterns, ctx) {
                ctx.log().error(e.to_string());
                return false;
            }
        }
        true
    }
}
