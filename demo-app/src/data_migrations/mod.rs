// Generated by `customs generate`. Regenerated whenever a migration is added.

pub mod backfill_display_names;
pub mod test_migration;

use customs_orm::MigrationRegistry;

/// Every data migration in this directory, by file name
pub fn registry() -> MigrationRegistry {
    MigrationRegistry::new()
        .register::<backfill_display_names::BackfillDisplayNames>("backfill_display_names")
        .register::<test_migration::TestMigration>("test_migration")
}
