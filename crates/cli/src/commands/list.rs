use customs_orm::MigrationRegistry;

/// One registered migration name per line
pub fn render(registry: &MigrationRegistry) -> String {
    if registry.is_empty() {
        return "No data migrations registered\n".to_string();
    }
    registry.names().map(|name| format!("{}\n", name)).collect()
}
