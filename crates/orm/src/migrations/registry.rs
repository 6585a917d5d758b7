//! Migration Registry - resolves migration names to constructors
//!
//! Rust cannot load a migration file by name at runtime, so applications
//! register their migration types up front (the scaffold generator keeps a
//! `registry()` function up to date for them).

use std::collections::BTreeMap;

use customs_core::naming::to_snake_case;

use super::definitions::{DataMigration, FromArgs, MigrationArgs};
use crate::error::{MigrationError, MigrationResult};

type Constructor =
    Box<dyn Fn(MigrationArgs) -> MigrationResult<Box<dyn DataMigration>> + Send + Sync>;

/// Name to constructor map for data migrations
#[derive(Default)]
pub struct MigrationRegistry {
    entries: BTreeMap<String, Constructor>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration type under `name`
    pub fn register<M>(self, name: &str) -> Self
    where
        M: DataMigration + FromArgs + 'static,
    {
        self.register_fn(name, |args| {
            let migration: Box<dyn DataMigration> = Box::new(M::from_args(args)?);
            Ok(migration)
        })
    }

    /// Register a constructor function under `name`
    pub fn register_fn<F>(mut self, name: &str, constructor: F) -> Self
    where
        F: Fn(MigrationArgs) -> MigrationResult<Box<dyn DataMigration>> + Send + Sync + 'static,
    {
        let key = normalize_name(name);
        if self.entries.insert(key.clone(), Box::new(constructor)).is_some() {
            tracing::warn!("Data migration '{}' registered twice; keeping the last one", key);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct the migration registered under `name`
    pub fn build(&self, name: &str, args: MigrationArgs) -> MigrationResult<Box<dyn DataMigration>> {
        let key = normalize_name(name);
        let constructor = self
            .entries
            .get(&key)
            .ok_or_else(|| MigrationError::NotFound(name.to_string()))?;
        constructor(args)
    }
}

impl std::fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Normalize a migration name: `TestMigration`, `test_migration` and
/// `db/data_migrations/test_migration.rs` all become `test_migration`.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = file.strip_suffix(".rs").unwrap_or(file);
    to_snake_case(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MigrationContext;
    use async_trait::async_trait;

    struct Noop {
        args: MigrationArgs,
    }

    impl FromArgs for Noop {
        fn from_args(args: MigrationArgs) -> MigrationResult<Self> {
            Ok(Self { args })
        }
    }

    #[async_trait(?Send)]
    impl DataMigration for Noop {
        async fn up(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
            Ok(())
        }

        async fn verify(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
            crate::verify!(self.args.len() < 10, "too many arguments");
            Ok(())
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("TestMigration"), "test_migration");
        assert_eq!(normalize_name("test_migration"), "test_migration");
        assert_eq!(normalize_name("test_migration.rs"), "test_migration");
        assert_eq!(normalize_name("src/data_migrations/test_migration.rs"), "test_migration");
        assert_eq!(normalize_name("  BackfillNames "), "backfill_names");
    }

    #[test]
    fn test_register_and_resolve_by_any_spelling() {
        let registry = MigrationRegistry::new().register::<Noop>("TestMigration");

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("test_migration"));
        assert!(registry.contains("TestMigration"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["test_migration"]);
        assert!(registry.build("test_migration", MigrationArgs::new()).is_ok());
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = MigrationRegistry::new().register::<Noop>("noop");

        match registry.build("non_existent_migration", MigrationArgs::new()) {
            Err(MigrationError::NotFound(name)) => assert_eq!(name, "non_existent_migration"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected lookup to fail"),
        }
    }

    #[test]
    fn test_constructor_errors_propagate() {
        let registry = MigrationRegistry::new().register_fn("picky", |args| {
            let _id: i64 = args.get(0)?;
            Ok(Box::new(Noop { args }) as Box<dyn DataMigration>)
        });

        let err = registry.build("picky", MigrationArgs::new()).err().unwrap();
        assert!(matches!(err, MigrationError::InvalidArgument(_)));
        assert!(registry.build("picky", MigrationArgs::from_comma_list("7")).is_ok());
    }
}
