mod data_migrations;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    customs_cli::main_with(data_migrations::registry()).await
}
