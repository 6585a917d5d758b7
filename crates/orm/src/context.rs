//! Migration Context - the handle a migration uses to reach the store
//!
//! The context owns the run's transaction. Everything a migration reads or
//! writes through it, including batch work, is part of that one transaction.

use std::sync::Arc;

use sqlx::{Any, AnyConnection, Transaction};

use crate::batching::{BatchOptions, BatchStats, Throttle};
use crate::error::MigrationResult;

/// Per-run access to the open transaction and the batching helpers
pub struct MigrationContext {
    pub(crate) tx: Transaction<'static, Any>,
    pub(crate) throttle: Arc<dyn Throttle>,
    pub(crate) defaults: BatchOptions,
    pub(crate) stats: BatchStats,
}

impl MigrationContext {
    /// Wrap an open transaction
    pub fn new(tx: Transaction<'static, Any>, throttle: Arc<dyn Throttle>, defaults: BatchOptions) -> Self {
        Self {
            tx,
            throttle,
            defaults,
            stats: BatchStats::default(),
        }
    }

    /// Connection of the run's transaction, for hand-written queries
    pub fn conn(&mut self) -> &mut AnyConnection {
        &mut self.tx
    }

    /// Execute a statement inside the transaction and return the affected row count
    pub async fn execute(&mut self, sql: &str) -> MigrationResult<u64> {
        let result = sqlx::query(sql).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    /// Batch options configured for this run
    pub fn batch_options(&self) -> BatchOptions {
        self.defaults
    }

    /// Batching counters accumulated so far in this run
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Give the transaction back, to commit or roll it back
    pub fn into_transaction(self) -> Transaction<'static, Any> {
        self.tx
    }
}
