use customs_codegen::CodegenError;
use customs_core::ConfigError;
use customs_orm::MigrationError;
use thiserror::Error;

/// Every way a command can fail; all of them exit with status 1
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}
