//! Data migration scaffolding
//!
//! `MigrationScaffold::generate` writes one migration file and rebuilds the
//! directory's `mod.rs`, which declares every migration module and exposes a
//! `registry()` function. A migration file's struct is the PascalCase form
//! of its file name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use customs_core::naming::{to_pascal_case, to_snake_case};
use regex::Regex;

use crate::error::CodegenError;
use crate::templates::{render_template, MIGRATION_TEMPLATE, REGISTRY_TEMPLATE};
use crate::writer::{CodeWriter, WriteOutcome};

const RESERVED: &[&str] = &[
    "mod", "as", "async", "await", "crate", "dyn", "enum", "fn", "impl", "let", "match", "move", "pub",
    "ref", "self", "static", "struct", "super", "trait", "type", "unsafe", "use", "where",
];

/// Files written by one `generate` call
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub name: String,
    pub struct_name: String,
    pub path: PathBuf,
    pub outcome: WriteOutcome,
    pub registry_path: PathBuf,
}

/// Scaffold generator for one migrations directory
pub struct MigrationScaffold {
    dir: PathBuf,
    writer: CodeWriter,
}

impl MigrationScaffold {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writer: CodeWriter::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create `<dir>/<snake_name>.rs` and regenerate `<dir>/mod.rs`
    pub fn generate(&self, name: &str, force: bool) -> Result<GeneratedMigration, CodegenError> {
        validate_name(name)?;

        let snake_name = to_snake_case(name);
        let struct_name = to_pascal_case(&snake_name);
        let path = self.dir.join(format!("{}.rs", snake_name));

        let mut context = HashMap::new();
        context.insert("name", snake_name.clone());
        context.insert("struct_name", struct_name.clone());
        context.insert(
            "created_at",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        let content = render_template(MIGRATION_TEMPLATE, &context)?;

        let outcome = self.writer.write_new(&path, &content, force)?;
        tracing::info!("Wrote data migration {} ({:?})", path.display(), outcome);

        let registry_path = self.write_registry()?;

        Ok(GeneratedMigration {
            name: snake_name,
            struct_name,
            path,
            outcome,
            registry_path,
        })
    }

    /// Module names of the migration files in the directory, sorted
    pub fn migration_names(&self) -> Result<Vec<String>, CodegenError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some("mod") | None => {}
                Some(stem) if validate_name(stem).is_ok() && to_snake_case(stem) == stem => {
                    names.push(stem.to_string());
                }
                Some(stem) => tracing::warn!("Skipping {}.rs: not a valid migration module name", stem),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Rebuild `<dir>/mod.rs` from the migration files present
    pub fn write_registry(&self) -> Result<PathBuf, CodegenError> {
        let names = self.migration_names()?;
        let path = self.dir.join("mod.rs");

        let mut context = HashMap::new();
        context.insert(
            "modules",
            names.iter().map(|name| format!("pub mod {};\n", name)).collect::<String>(),
        );
        context.insert(
            "registrations",
            names
                .iter()
                .map(|name| format!("\n        .register::<{}::{}>(\"{}\")", name, to_pascal_case(name), name))
                .collect::<String>(),
        );

        let content = render_template(REGISTRY_TEMPLATE, &context)?;
        self.writer.write_if_changed(&path, &content)?;
        Ok(path)
    }
}

/// Check that `name` can become both a module and a type name
pub fn validate_name(name: &str) -> Result<(), CodegenError> {
    let pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").map_err(|e| CodegenError::Template {
        message: format!("Regex error: {}", e),
    })?;

    if !pattern.is_match(name) {
        return Err(CodegenError::invalid_name(
            name,
            "must start with a letter and contain only letters, digits and underscores",
        ));
    }
    if RESERVED.contains(&to_snake_case(name).as_str()) {
        return Err(CodegenError::invalid_name(name, "is a reserved Rust keyword"));
    }
    Ok(())
}
