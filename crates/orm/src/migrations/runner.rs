//! Migration Runner - executes one data migration inside one transaction
//!
//! `up` and `verify` share the transaction. The run commits only when both
//! succeed; on any failure it reports, rolls back and hands the migration's
//! own error back to the caller.

use std::sync::Arc;
use std::time::Instant;

use customs_core::CustomsConfig;
use sqlx::AnyPool;
use tracing::{debug, info, warn};

use super::definitions::{DataMigration, FromArgs, MigrationArgs};
use super::registry::MigrationRegistry;
use super::report::{ConsoleReporter, Reporter};
use crate::batching::{BatchOptions, SleepThrottle, Throttle};
use crate::context::MigrationContext;
use crate::database::{create_pool, PoolConfig};
use crate::error::{MigrationError, MigrationResult};
use crate::transaction::{begin, TransactionConfig};

/// Runs data migrations against a connection pool
pub struct Runner {
    pool: AnyPool,
    transaction: TransactionConfig,
    batch_defaults: BatchOptions,
    throttle: Arc<dyn Throttle>,
    reporter: Arc<dyn Reporter>,
}

impl Runner {
    /// Create a runner with console reporting and sleeping throttle
    pub fn new(pool: AnyPool) -> Self {
        Self {
            pool,
            transaction: TransactionConfig::default(),
            batch_defaults: BatchOptions::default(),
            throttle: Arc::new(SleepThrottle),
            reporter: Arc::new(ConsoleReporter),
        }
    }

    /// Connect to the configured database and apply the configured defaults
    pub async fn connect(config: &CustomsConfig) -> MigrationResult<Self> {
        config.validate()?;
        let pool = create_pool(&config.database_url, &PoolConfig::from_config(config)).await?;

        Ok(Self::new(pool)
            .with_transaction_config(TransactionConfig::from_config(config)?)
            .with_batch_defaults(BatchOptions::from_config(config)))
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_transaction_config(mut self, config: TransactionConfig) -> Self {
        self.transaction = config;
        self
    }

    pub fn with_batch_defaults(mut self, options: BatchOptions) -> Self {
        self.batch_defaults = options;
        self
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn batch_defaults(&self) -> BatchOptions {
        self.batch_defaults
    }

    /// Run a migration: `up`, then `verify`, then commit.
    ///
    /// A failure to begin the transaction is returned without any status
    /// output. Every later failure prints the failure status, rolls back and
    /// returns the migration's own error.
    pub async fn run(&self, migration: &mut dyn DataMigration) -> MigrationResult<()> {
        let started = Instant::now();
        let tx = begin(&self.pool, &self.transaction).await?;
        debug!("Data migration transaction opened");

        let mut ctx = MigrationContext::new(tx, Arc::clone(&self.throttle), self.batch_defaults);
        let outcome = apply(migration, &mut ctx).await;
        let stats = ctx.stats();
        let tx = ctx.into_transaction();

        match outcome {
            Ok(()) => {
                if let Err(e) = tx.commit().await {
                    let err = MigrationError::Transaction(format!("Failed to commit data migration: {}", e));
                    self.reporter.failure(&err);
                    return Err(err);
                }

                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    batches = stats.batches,
                    rows = stats.rows,
                    pauses = stats.pauses,
                    "Data migration committed"
                );
                self.reporter.success();
                Ok(())
            }
            Err(err) => {
                self.reporter.failure(&err);
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Failed to roll back data migration: {}", rollback_err);
                }

                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    batches = stats.batches,
                    "Data migration rolled back: {}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Construct `M` from `args` and run it
    pub async fn run_with<M>(&self, args: MigrationArgs) -> MigrationResult<()>
    where
        M: DataMigration + FromArgs,
    {
        let mut migration = M::from_args(args)?;
        self.run(&mut migration).await
    }

    /// Resolve `name` in the registry, construct it from `args` and run it
    pub async fn run_named(
        &self,
        registry: &MigrationRegistry,
        name: &str,
        args: MigrationArgs,
    ) -> MigrationResult<()> {
        if name.trim().is_empty() {
            return Err(MigrationError::MissingName);
        }

        let mut migration = registry.build(name, args)?;
        info!("Running data migration {}", name);
        self.run(migration.as_mut()).await
    }
}

async fn apply(migration: &mut dyn DataMigration, ctx: &mut MigrationContext) -> MigrationResult<()> {
    migration.up(ctx).await?;
    migration.verify(ctx).await
}
