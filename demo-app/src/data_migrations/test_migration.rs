//! Data migration `test_migration`, generated 2026-10-19 09:12:44 UTC.

use customs_orm::prelude::*;

/// Touches nothing; reports which steps ran and with what arguments
pub struct TestMigration {
    args: Option<Vec<String>>,
}

impl FromArgs for TestMigration {
    fn from_args(args: MigrationArgs) -> MigrationResult<Self> {
        let args = (!args.is_empty()).then(|| args.into_vec());
        Ok(Self { args })
    }
}

#[async_trait(?Send)]
impl DataMigration for TestMigration {
    async fn up(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        match &self.args {
            Some(args) => println!("up with args: {:?}", args),
            None => println!("up"),
        }
        Ok(())
    }

    async fn verify(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        println!("verify!");
        Ok(())
    }
}
