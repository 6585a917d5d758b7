mod common;

use std::sync::Arc;

use common::{count_users, recorders, seeded_pool};
use customs_orm::prelude::*;
use customs_orm::{IsolationLevel, MigrationRegistry, Runner, TransactionConfig};

async fn insert_user(ctx: &mut MigrationContext, name: &str) -> MigrationResult<()> {
    ctx.execute(&format!("INSERT INTO test_users (name) VALUES ('{}')", name))
        .await?;
    Ok(())
}

async fn users_named(ctx: &mut MigrationContext, name: &str) -> MigrationResult<i64> {
    Ok(sqlx::query_scalar(&format!("SELECT COUNT(*) FROM test_users WHERE name = '{}'", name))
        .fetch_one(ctx.conn())
        .await?)
}

#[derive(Default)]
struct CreateUser {
    verified: bool,
}

#[async_trait(?Send)]
impl DataMigration for CreateUser {
    async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        insert_user(ctx, "Test User").await
    }

    async fn verify(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        self.verified = true;
        let count = users_named(ctx, "Test User").await?;
        verify!(count == 1, "expected one Test User, found {}", count);
        Ok(())
    }
}

struct FailingVerify;

#[async_trait(?Send)]
impl DataMigration for FailingVerify {
    async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        insert_user(ctx, "Test User").await
    }

    async fn verify(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        Err(MigrationError::verification("Always fails"))
    }
}

#[derive(Default)]
struct FailingUp {
    verified: bool,
}

#[async_trait(?Send)]
impl DataMigration for FailingUp {
    async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        insert_user(ctx, "Half Done").await?;
        Err(MigrationError::failed("Kaboom"))
    }

    async fn verify(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        self.verified = true;
        Ok(())
    }
}

struct NamedUsers {
    names: Vec<String>,
}

impl FromArgs for NamedUsers {
    fn from_args(args: MigrationArgs) -> MigrationResult<Self> {
        Ok(Self { names: args.into_vec() })
    }
}

#[async_trait(?Send)]
impl DataMigration for NamedUsers {
    async fn up(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        for name in &self.names {
            insert_user(ctx, name).await?;
        }
        Ok(())
    }

    async fn verify(&mut self, ctx: &mut MigrationContext) -> MigrationResult<()> {
        for name in &self.names {
            verify!(users_named(ctx, name).await? == 1, "{} was not inserted", name);
        }
        Ok(())
    }
}

struct UpstreamFailure;

#[async_trait(?Send)]
impl DataMigration for UpstreamFailure {
    async fn up(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        Err(anyhow::anyhow!("service unavailable").into())
    }

    async fn verify(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_successful_migration_commits_and_reports_once() {
    let pool = seeded_pool(&[]).await;
    let (reporter, throttle) = recorders();
    let runner = Runner::new(pool.clone())
        .with_reporter(reporter.clone())
        .with_throttle(throttle);

    let mut migration = CreateUser::default();
    runner.run(&mut migration).await.unwrap();

    assert!(migration.verified);
    assert_eq!(count_users(&pool).await, 1);
    assert_eq!(reporter.events(), vec!["success"]);
}

#[tokio::test]
async fn test_failed_verification_rolls_back_and_returns_the_error() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool.clone()).with_reporter(reporter.clone());

    let err = runner.run(&mut FailingVerify).await.unwrap_err();

    assert!(err.is_verification());
    assert_eq!(err.to_string(), "Always fails");
    assert_eq!(count_users(&pool).await, 0);
    assert_eq!(reporter.events(), vec!["failure: Always fails"]);
}

#[tokio::test]
async fn test_failed_up_skips_verify_and_rolls_back() {
    let pool = seeded_pool(&["Existing"]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool.clone()).with_reporter(reporter.clone());

    let mut migration = FailingUp::default();
    let err = runner.run(&mut migration).await.unwrap_err();

    assert!(matches!(err, MigrationError::Failed(ref message) if message == "Kaboom"));
    assert!(!migration.verified);
    assert_eq!(count_users(&pool).await, 1);
    assert_eq!(reporter.events(), vec!["failure: Kaboom"]);
}

#[tokio::test]
async fn test_anyhow_errors_pass_through_unchanged() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool).with_reporter(reporter.clone());

    let err = runner.run(&mut UpstreamFailure).await.unwrap_err();

    assert!(matches!(err, MigrationError::Other(_)));
    assert_eq!(err.to_string(), "service unavailable");
    assert_eq!(reporter.events(), vec!["failure: service unavailable"]);
}

#[tokio::test]
async fn test_run_with_forwards_arguments_to_the_constructor() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool.clone()).with_reporter(reporter.clone());

    runner
        .run_with::<NamedUsers>(MigrationArgs::from_comma_list("arg1,arg2"))
        .await
        .unwrap();

    assert_eq!(common::user_names(&pool).await, vec!["arg1", "arg2"]);
    assert_eq!(reporter.events(), vec!["success"]);
}

#[tokio::test]
async fn test_run_named_resolves_registered_migrations() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool.clone()).with_reporter(reporter.clone());
    let registry = MigrationRegistry::new().register::<NamedUsers>("NamedUsers");

    runner
        .run_named(&registry, "named_users", MigrationArgs::from_comma_list("Ada"))
        .await
        .unwrap();
    assert_eq!(common::user_names(&pool).await, vec!["Ada"]);

    let err = runner
        .run_named(&registry, "non_existent_migration", MigrationArgs::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Migration not found: non_existent_migration");

    let err = runner.run_named(&registry, "", MigrationArgs::new()).await.unwrap_err();
    assert!(matches!(err, MigrationError::MissingName));

    // Lookup failures happen before a transaction exists, so nothing is reported
    assert_eq!(reporter.events(), vec!["success"]);
}

#[tokio::test]
async fn test_serializable_isolation_runs_on_sqlite() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool.clone())
        .with_reporter(reporter.clone())
        .with_transaction_config(TransactionConfig::default().isolation_level(IsolationLevel::Serializable));

    runner.run(&mut CreateUser::default()).await.unwrap();
    assert_eq!(count_users(&pool).await, 1);
}

#[tokio::test]
async fn test_unsupported_isolation_fails_before_the_migration_starts() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Runner::new(pool.clone())
        .with_reporter(reporter.clone())
        .with_transaction_config(TransactionConfig::default().isolation_level(IsolationLevel::ReadCommitted));

    let mut migration = CreateUser::default();
    let err = runner.run(&mut migration).await.unwrap_err();

    assert!(matches!(err, MigrationError::Transaction(_)));
    assert!(!migration.verified);
    assert!(reporter.events().is_empty());
    assert_eq!(count_users(&pool).await, 0);
}

#[tokio::test]
async fn test_connect_applies_configured_defaults() {
    let config = customs_core::CustomsConfig::new("sqlite::memory:")
        .with_batch_size(250)
        .with_throttle_seconds(0.5);

    let runner = Runner::connect(&config).await.unwrap();
    assert_eq!(runner.batch_defaults(), BatchOptions::new().batch_size(250).throttle_seconds(0.5));

    let bad = customs_core::CustomsConfig::new("sqlite::memory:").with_isolation_level("sideways");
    assert!(matches!(Runner::connect(&bad).await, Err(MigrationError::Config(_))));
}

#[tokio::test]
async fn test_runner_can_be_shared() {
    let pool = seeded_pool(&[]).await;
    let (reporter, _) = recorders();
    let runner = Arc::new(Runner::new(pool.clone()).with_reporter(reporter.clone()));

    runner.run(&mut CreateUser::default()).await.unwrap();
    let err = runner.run(&mut CreateUser::default()).await.unwrap_err();

    assert_eq!(err.to_string(), "expected one Test User, found 2");
    assert_eq!(count_users(&pool).await, 1);
    assert_eq!(reporter.events(), vec!["success", "failure: expected one Test User, found 2"]);
}
