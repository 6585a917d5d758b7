//! Data migration `backfill_display_names`, generated 2026-10-19 09:14:02 UTC.

use customs_orm::prelude::*;

/// Copies `users.name` into `users.display_name` wherever it is missing.
///
/// Arguments: optional batch size, overriding the configured default.
pub struct BackfillDisplayNames {
    batch_size: Option<usize>,
}

impl FromArgs for BackfillDisplayNames {
    fn from_args(args: MigrationArgs) -> MigrationResult<Self> {
        Ok(Self {
            batch_size: args.optional(0)?,
        })
    }
}

#[async_trait(?Send)]
impl DataMigration for BackfillDisplayNames {
    async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        let mut options = ctx.batch_options();
        if let Some(batch_size) = self.batch_size {
            options = options.batch_size(batch_size);
        }

        let scope = Scope::table("users").filter("display_name IS NULL");
        let mut updated = 0;
        ctx.batch(&scope, options, async |conn, batch| -> MigrationResult<()> {
            updated += batch.update_all(conn, "display_name = name").await?;
            Ok(())
        })
        .await?;

        println!("Backfilled {} display names in {} batches", updated, ctx.stats().batches);
        Ok(())
    }

    async fn verify(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        let missing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE display_name IS NULL")
            .fetch_one(ctx.conn())
            .await?;
        verify!(missing == 0, "{} users still have no display name", missing);
        Ok(())
    }
}
