//! # customs-orm: transactional data migrations
//!
//! A data migration changes rows (`up`) and then checks its own work
//! (`verify`) inside a single transaction. Anything that fails rolls the
//! whole change back. `MigrationContext::batch` and `find_each` walk large
//! tables in throttled slices within that same transaction.
//!
//! ```no_run
//! use customs_orm::prelude::*;
//!
//! struct BackfillNames;
//!
//! #[async_trait(?Send)]
//! impl DataMigration for BackfillNames {
//!     async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
//!         let scope = Scope::table("users").filter("name IS NULL");
//!         let options = ctx.batch_options();
//!         ctx.batch(&scope, options, async |conn, batch| -> MigrationResult<()> {
//!             batch.update_all(conn, "name = 'unknown'").await?;
//!             Ok(())
//!         })
//!         .await
//!     }
//!
//!     async fn verify(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
//!         let missing: i64 = customs_orm::sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE name IS NULL")
//!             .fetch_one(ctx.conn())
//!             .await?;
//!         verify!(missing == 0, "{} users still have no name", missing);
//!         Ok(())
//!     }
//! }
//! ```

pub mod batching;
pub mod context;
pub mod database;
pub mod error;
pub mod migrations;
pub mod security;
pub mod transaction;

pub use batching::*;
pub use context::*;
pub use database::*;
pub use error::*;
pub use migrations::*;
pub use transaction::*;

pub use async_trait::async_trait;
pub use sqlx;

/// Everything a migration file needs
pub mod prelude {
    pub use crate::batching::{Batch, BatchOptions, BatchOrder, Scope};
    pub use crate::context::MigrationContext;
    pub use crate::error::{MigrationError, MigrationResult};
    pub use crate::migrations::{DataMigration, FromArgs, MigrationArgs};
    pub use crate::verify;
    pub use async_trait::async_trait;
    pub use sqlx::{AnyConnection, FromRow};
}
