use std::fs;
use std::path::Path;

use crate::error::CodegenError;

/// Outcome of writing a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Overwritten,
    Unchanged,
}

pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `content`, leaving the file untouched when it already matches
    pub fn write_if_changed(&self, path: &Path, content: &str) -> Result<WriteOutcome, CodegenError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let existing = fs::read_to_string(path)?;
            if existing == content {
                return Ok(WriteOutcome::Unchanged);
            }
            fs::write(path, content)?;
            return Ok(WriteOutcome::Overwritten);
        }

        fs::write(path, content)?;
        Ok(WriteOutcome::Created)
    }

    /// Write a file that must not already exist, unless `force` is set
    pub fn write_new(&self, path: &Path, content: &str, force: bool) -> Result<WriteOutcome, CodegenError> {
        if path.exists() && !force {
            return Err(CodegenError::FileExists {
                path: path.to_path_buf(),
            });
        }
        self.write_if_changed(path, content)
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
