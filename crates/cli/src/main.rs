use std::process::ExitCode;

use customs_orm::MigrationRegistry;

/// Standalone binary with no migrations compiled in. Applications embed
/// `customs_cli::main_with` with their own registry instead.
#[tokio::main]
async fn main() -> ExitCode {
    customs_cli::main_with(MigrationRegistry::new()).await
}
