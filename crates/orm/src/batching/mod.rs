//! Batching - throttled keyset iteration over large scopes
//!
//! `MigrationContext::batch` walks a scope in primary key order, handing
//! each slice to the caller and pausing between slices so a long migration
//! does not monopolize the database. `find_each` is the per-row variant.

pub mod batch;
pub mod options;
pub mod scope;
pub mod throttle;

pub use batch::*;
pub use options::*;
pub use scope::*;
pub use throttle::*;

use std::sync::Arc;

use sqlx::any::AnyRow;
use sqlx::{AnyConnection, FromRow};
use tracing::debug;

use crate::context::MigrationContext;
use crate::error::MigrationResult;

/// Counters for the batching done in one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches: usize,
    pub rows: usize,
    pub pauses: usize,
}

impl MigrationContext {
    /// Invoke `work` once per slice of at most `options.batch_size` rows, in
    /// primary key order, pausing for the throttle after every slice.
    ///
    /// A slice shorter than the batch size ends the iteration without another
    /// query. An empty scope invokes `work` zero times and never pauses. The
    /// first error from `work` stops the iteration and is returned as is.
    pub async fn batch<F>(&mut self, scope: &Scope, options: BatchOptions, mut work: F) -> MigrationResult<()>
    where
        F: AsyncFnMut(&mut AnyConnection, Batch) -> MigrationResult<()>,
    {
        options.validate()?;
        scope.validate()?;

        let scope = Arc::new(scope.clone());
        let pause = options.pause();
        let mut cursor = None;
        let mut index = 0;

        loop {
            let sql = scope.keys_sql(cursor, options.batch_size)?;
            let ids: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(&mut *self.tx).await?;
            if ids.is_empty() {
                break;
            }

            let exhausted = ids.len() < options.batch_size;
            cursor = ids.last().copied();
            self.stats.batches += 1;
            self.stats.rows += ids.len();
            debug!(
                "Batch {} of {}: {} rows up to key {:?}",
                index,
                scope.table_name(),
                ids.len(),
                cursor
            );

            work(&mut *self.tx, Batch::new(Arc::clone(&scope), ids, index)).await?;
            index += 1;

            if let Some(duration) = pause {
                self.throttle.pause(duration).await;
                self.stats.pauses += 1;
            }

            if exhausted {
                break;
            }
        }

        Ok(())
    }

    /// Invoke `each` for every row of the scope, loaded batch by batch
    pub async fn find_each<T, F>(&mut self, scope: &Scope, options: BatchOptions, mut each: F) -> MigrationResult<()>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
        F: AsyncFnMut(&mut AnyConnection, T) -> MigrationResult<()>,
    {
        self.batch(scope, options, async |conn: &mut AnyConnection, batch: Batch| -> MigrationResult<()> {
            let rows = batch.fetch_all::<T>(&mut *conn).await?;
            for row in rows {
                each(&mut *conn, row).await?;
            }
            Ok(())
        })
        .await
    }
}
