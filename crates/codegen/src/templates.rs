use std::collections::HashMap;

use regex::Regex;

use crate::error::CodegenError;

/// Replace every `{{key}}` placeholder with its value from `context`
pub fn render_template(template: &str, context: &HashMap<&str, String>) -> Result<String, CodegenError> {
    let mut result = template.to_string();

    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    let leftover = Regex::new(r"\{\{([a-z_]+)\}\}").map_err(|e| CodegenError::Template {
        message: format!("Regex error: {}", e),
    })?;
    if let Some(cap) = leftover.captures(&result) {
        return Err(CodegenError::Template {
            message: format!("no value for placeholder '{}'", &cap[1]),
        });
    }

    Ok(result)
}

pub static MIGRATION_TEMPLATE: &str = r#"//! Data migration `{{name}}`, generated {{created_at}}.

use customs_orm::prelude::*;

pub struct {{struct_name}};

impl FromArgs for {{struct_name}} {
    fn from_args(_args: MigrationArgs) -> MigrationResult<Self> {
        Ok(Self)
    }
}

#[async_trait(?Send)]
impl DataMigration for {{struct_name}} {
    async fn up(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        Ok(())
    }

    async fn verify(&mut self, _ctx: &mut MigrationContext) -> MigrationResult<()> {
        Ok(())
    }
}
"#;

pub static REGISTRY_TEMPLATE: &str = r#"// Generated by `customs generate`. Regenerated whenever a migration is added.

{{modules}}
use customs_orm::MigrationRegistry;

/// Every data migration in this directory, by file name
pub fn registry() -> MigrationRegistry {
    MigrationRegistry::new(){{registrations}}
}
"#;
