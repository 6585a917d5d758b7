use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("{} already exists (use --force to overwrite)", path.display())]
    FileExists { path: PathBuf },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodegenError {
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodegenError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
