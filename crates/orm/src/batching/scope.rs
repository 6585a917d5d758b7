//! Batch scopes - ordered row sets addressed by an integer primary key
//!
//! Iteration is keyset based: each batch selects the next `batch_size` keys
//! strictly after the last key of the previous batch, so rows are never
//! skipped or repeated while the scope is stable.

use crate::error::MigrationResult;
use crate::security::{escape_identifier, quote_qualified, validate_fragment, validate_identifier};

/// Primary key order of a batch iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchOrder {
    #[default]
    Asc,
    Desc,
}

impl BatchOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            BatchOrder::Asc => "ASC",
            BatchOrder::Desc => "DESC",
        }
    }

    /// Comparison that selects keys past `key` in this order
    fn after(&self) -> &'static str {
        match self {
            BatchOrder::Asc => ">",
            BatchOrder::Desc => "<",
        }
    }
}

/// An ordered, queryable row set to iterate in batches
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    table: String,
    primary_key: String,
    columns: Vec<String>,
    conditions: Vec<String>,
    order: BatchOrder,
    start: Option<i64>,
    finish: Option<i64>,
}

impl Scope {
    /// All rows of `table` (optionally `schema.table`), keyed by `id`
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: "id".to_string(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order: BatchOrder::Asc,
            start: None,
            finish: None,
        }
    }

    /// Integer primary key column used for ordering and slicing
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Columns loaded by `Batch::fetch_all`; all columns when unset
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the scope with a raw SQL condition; repeated calls are AND-ed
    ///
    /// The condition may not contain `;`, comment markers or `UNION SELECT`
    /// outside of quoted literals. Anything inside `'...'` is left alone.
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn order(mut self, order: BatchOrder) -> Self {
        self.order = order;
        self
    }

    /// First key to include, inclusive, in iteration order
    pub fn start(mut self, key: i64) -> Self {
        self.start = Some(key);
        self
    }

    /// Last key to include, inclusive, in iteration order
    pub fn finish(mut self, key: i64) -> Self {
        self.finish = Some(key);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    pub fn ordering(&self) -> BatchOrder {
        self.order
    }

    /// Check every identifier and condition before any SQL is built
    pub fn validate(&self) -> MigrationResult<()> {
        quote_qualified(&self.table)?;
        validate_identifier(&self.primary_key)?;
        for column in &self.columns {
            validate_identifier(column)?;
        }
        for condition in &self.conditions {
            validate_fragment(condition)?;
        }
        Ok(())
    }

    /// Query for the next page of keys after `after`
    pub(crate) fn keys_sql(&self, after: Option<i64>, limit: usize) -> MigrationResult<String> {
        let table = quote_qualified(&self.table)?;
        let pk = escape_identifier(&self.primary_key);

        let mut clauses = self.condition_clauses();
        let (lower, upper) = match self.order {
            BatchOrder::Asc => (self.start, self.finish),
            BatchOrder::Desc => (self.finish, self.start),
        };
        if let Some(lower) = lower {
            clauses.push(format!("{} >= {}", pk, lower));
        }
        if let Some(upper) = upper {
            clauses.push(format!("{} <= {}", pk, upper));
        }
        if let Some(after) = after {
            clauses.push(format!("{} {} {}", pk, self.order.after(), after));
        }

        Ok(format!(
            "SELECT CAST({pk} AS BIGINT) FROM {table}{} ORDER BY {pk} {} LIMIT {limit}",
            where_sql(&clauses),
            self.order.as_sql(),
        ))
    }

    /// Query loading the rows of one batch in scope order
    pub(crate) fn rows_sql(&self, keys: &[i64]) -> MigrationResult<String> {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| escape_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        Ok(format!(
            "SELECT {} FROM {}{} ORDER BY {} {}",
            columns,
            quote_qualified(&self.table)?,
            where_sql(&self.batch_clauses(keys)),
            escape_identifier(&self.primary_key),
            self.order.as_sql(),
        ))
    }

    pub(crate) fn update_sql(&self, keys: &[i64], assignments: &str) -> MigrationResult<String> {
        validate_fragment(assignments)?;
        Ok(format!(
            "UPDATE {} SET {}{}",
            quote_qualified(&self.table)?,
            assignments,
            where_sql(&self.batch_clauses(keys)),
        ))
    }

    pub(crate) fn delete_sql(&self, keys: &[i64]) -> MigrationResult<String> {
        Ok(format!(
            "DELETE FROM {}{}",
            quote_qualified(&self.table)?,
            where_sql(&self.batch_clauses(keys)),
        ))
    }

    /// Predicate matching exactly the given keys within this scope
    pub fn predicate_for(&self, keys: &[i64]) -> String {
        self.batch_clauses(keys).join(" AND ")
    }

    fn condition_clauses(&self) -> Vec<String> {
        self.conditions.iter().map(|c| format!("({})", c)).collect()
    }

    fn batch_clauses(&self, keys: &[i64]) -> Vec<String> {
        let list = keys.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
        let mut clauses = vec![format!("{} IN ({})", escape_identifier(&self.primary_key), list)];
        clauses.extend(self.condition_clauses());
        clauses
    }
}

fn where_sql(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}
