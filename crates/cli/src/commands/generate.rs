use std::path::Path;

use customs_codegen::{MigrationScaffold, WriteOutcome};

use crate::error::CliError;

pub fn generate(name: &str, dir: &Path, force: bool) -> Result<(), CliError> {
    let generated = MigrationScaffold::new(dir).generate(name, force)?;

    let verb = match generated.outcome {
        WriteOutcome::Created => "Created",
        WriteOutcome::Overwritten => "Overwrote",
        WriteOutcome::Unchanged => "Unchanged",
    };
    println!("✅ {} data migration: {}", verb, generated.path.display());
    println!("   Registered {} in {}", generated.struct_name, generated.registry_path.display());
    Ok(())
}
