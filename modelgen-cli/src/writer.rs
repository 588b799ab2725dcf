//! File writer for rendered model units.
//!
//! This module writes rendered units below the output root. Existing files
//! are only replaced when `force` is set or the injected [`OverwritePolicy`]
//! agrees. Content goes to a temporary file next to the target which is then
//! renamed over it.

use crate::error::{CliResult, WriteError};
use modelgen::RenderedUnit;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Result of a write operation.
#[derive(Debug, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// File exists and overwriting was declined.
    Skipped {
        /// Path of the existing file.
        path: PathBuf,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Path where content would have been written.
        path: PathBuf,
        /// Content that would have been written.
        content: String,
    },
}

impl WriteResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. } => path,
            WriteResult::Skipped { path } => path,
            WriteResult::DryRun { path, .. } => path,
        }
    }

    /// Check if the file was actually written.
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    /// Get the number of bytes written (0 unless written).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } => *bytes,
            _ => 0,
        }
    }
}

/// Decides whether an existing file may be replaced.
pub trait OverwritePolicy {
    fn confirm_overwrite(&self, path: &Path) -> Result<bool, WriteError>;
}

/// Replace existing files without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl OverwritePolicy for AlwaysOverwrite {
    fn confirm_overwrite(&self, _path: &Path) -> Result<bool, WriteError> {
        Ok(true)
    }
}

/// Keep existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl OverwritePolicy for NeverOverwrite {
    fn confirm_overwrite(&self, _path: &Path) -> Result<bool, WriteError> {
        Ok(false)
    }
}

/// Ask on the terminal. Defaults to yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOverwrite;

impl OverwritePolicy for PromptOverwrite {
    fn confirm_overwrite(&self, path: &Path) -> Result<bool, WriteError> {
        inquire::Confirm::new(&format!("{} already exists. Overwrite?", path.display()))
            .with_default(true)
            .prompt()
            .map_err(|e| WriteError::Prompt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

/// Writes rendered units below an output root.
pub struct UnitWriter {
    root: PathBuf,
    force: bool,
    dry_run: bool,
    policy: Box<dyn OverwritePolicy>,
}

impl UnitWriter {
    /// Create a writer that prompts before replacing files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            force: false,
            dry_run: false,
            policy: Box::new(PromptOverwrite),
        }
    }

    /// Replace existing files without consulting the policy.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Report what would be written without touching the disk.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the policy consulted for existing files.
    pub fn with_policy(mut self, policy: impl OverwritePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write one rendered unit.
    pub fn write(&self, unit: &RenderedUnit) -> CliResult<WriteResult> {
        let path = self.root.join(&unit.path);

        if self.dry_run {
            return Ok(WriteResult::DryRun {
                path,
                content: unit.content.clone(),
            });
        }

        if path.exists() && !self.force && !self.policy.confirm_overwrite(&path)? {
            tracing::debug!(path = %path.display(), "skipping existing file");
            return Ok(WriteResult::Skipped { path });
        }

        let parent = path.parent().unwrap_or(self.root.as_path()).to_path_buf();
        if !parent.exists() {
            std::fs::create_dir_all(&parent).map_err(|e| WriteError::CreateDir {
                path: parent.clone(),
                source: e,
            })?;
        }

        persist(&parent, &path, &unit.content)?;
        tracing::debug!(path = %path.display(), bytes = unit.content.len(), "wrote unit");

        Ok(WriteResult::Written {
            path,
            bytes: unit.content.len(),
        })
    }

    /// Write every unit, stopping at the first error.
    pub fn write_all(&self, units: &[RenderedUnit]) -> CliResult<Vec<WriteResult>> {
        units.iter().map(|unit| self.write(unit)).collect()
    }
}

fn persist(dir: &Path, path: &Path, content: &str) -> Result<(), WriteError> {
    let write_error = |source| WriteError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
