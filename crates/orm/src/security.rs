//! SQL identifier and condition safety checks
//!
//! Batch scopes are assembled into SQL text, so every identifier is validated
//! and quoted, and raw conditions are screened for stacked statements.
//! Quoting makes reserved words such as `order` usable as column names.

use crate::error::{MigrationError, MigrationResult};

/// Characters allowed in SQL identifiers (alphanumeric, underscore, dollar)
const ALLOWED_IDENTIFIER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

/// Escape a SQL identifier (table name, column name, etc.)
///
/// ```
/// use customs_orm::security::escape_identifier;
///
/// assert_eq!(escape_identifier("user_table"), "\"user_table\"");
/// assert_eq!(escape_identifier("table\"name"), "\"table\"\"name\"");
/// ```
pub fn escape_identifier(identifier: &str) -> String {
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// Validate that an identifier is safe for use in SQL
pub fn validate_identifier(identifier: &str) -> MigrationResult<()> {
    let Some(first) = identifier.chars().next() else {
        return Err(MigrationError::InvalidScope(
            "Identifier cannot be empty".to_string(),
        ));
    };

    // PostgreSQL limit is 63 characters
    if identifier.len() > 63 {
        return Err(MigrationError::InvalidScope(format!(
            "Identifier '{}' is too long (max 63 characters)",
            identifier
        )));
    }

    if let Some(c) = identifier.chars().find(|c| !ALLOWED_IDENTIFIER_CHARS.contains(*c)) {
        return Err(MigrationError::InvalidScope(format!(
            "Identifier '{}' contains invalid character '{}'",
            identifier, c
        )));
    }

    if first.is_ascii_digit() {
        return Err(MigrationError::InvalidScope(format!(
            "Identifier '{}' cannot start with a number",
            identifier
        )));
    }

    Ok(())
}

/// Validate and quote a possibly schema-qualified name (`schema.table`)
pub fn quote_qualified(name: &str) -> MigrationResult<String> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(MigrationError::InvalidScope(format!(
            "Name '{}' has too many qualifiers",
            name
        )));
    }

    let mut quoted = Vec::with_capacity(parts.len());
    for part in parts {
        validate_identifier(part)?;
        quoted.push(escape_identifier(part));
    }
    Ok(quoted.join("."))
}

/// Validate a raw SQL fragment (condition or assignment list)
///
/// Fragments are written by migration authors, so this only rejects stacked
/// statements and comment sequences that would truncate the generated query.
/// Text inside quoted literals and quoted identifiers is not inspected.
pub fn validate_fragment(sql: &str) -> MigrationResult<()> {
    if sql.trim().is_empty() {
        return Err(MigrationError::InvalidScope(
            "SQL fragment cannot be empty".to_string(),
        ));
    }

    let bare = strip_quoted(sql)?;

    if bare.contains(';') {
        return Err(MigrationError::InvalidScope(
            "Multiple SQL statements not allowed".to_string(),
        ));
    }

    let bare_upper = bare.to_uppercase();
    let dangerous_patterns = ["--", "/*", "*/", "UNION SELECT", "UNION ALL SELECT"];
    for pattern in &dangerous_patterns {
        if bare_upper.contains(pattern) {
            return Err(MigrationError::InvalidScope(format!(
                "SQL fragment contains potentially dangerous pattern: {}",
                pattern
            )));
        }
    }

    Ok(())
}

/// Replace every `'...'` and `"..."` section with an empty pair of quotes.
/// A doubled quote inside a section is an escaped quote.
fn strip_quoted(sql: &str) -> MigrationResult<String> {
    let mut bare = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            bare.push(c);
            continue;
        }

        let mut closed = false;
        while let Some(inner) = chars.next() {
            if inner == c {
                if chars.peek() == Some(&c) {
                    chars.next();
                    continue;
                }
                closed = true;
                break;
            }
        }
        if !closed {
            return Err(MigrationError::InvalidScope(format!(
                "SQL fragment has an unterminated {} quote",
                c
            )));
        }

        bare.push(c);
        bare.push(c);
        // keep the surrounding tokens apart
        bare.push(' ');
    }

    Ok(bare)
}
