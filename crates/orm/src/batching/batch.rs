use std::sync::Arc;

use sqlx::any::AnyRow;
use sqlx::{AnyConnection, FromRow};

use super::scope::Scope;
use crate::error::MigrationResult;

/// One slice of a scope, at most `batch_size` rows, in scope order
///
/// A batch is a sub-scope: its statements reapply the scope's conditions
/// on top of the batch's key list.
#[derive(Debug, Clone)]
pub struct Batch {
    scope: Arc<Scope>,
    ids: Vec<i64>,
    index: usize,
}

impl Batch {
    pub(crate) fn new(scope: Arc<Scope>, ids: Vec<i64>, index: usize) -> Self {
        Self { scope, ids, index }
    }

    /// Zero-based position of this batch in the iteration
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Primary keys of this batch in scope order
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn first_id(&self) -> Option<i64> {
        self.ids.first().copied()
    }

    pub fn last_id(&self) -> Option<i64> {
        self.ids.last().copied()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// SQL predicate selecting exactly this batch's rows, for hand-written statements
    pub fn predicate(&self) -> String {
        self.scope.predicate_for(&self.ids)
    }

    /// Load the batch's rows
    pub async fn fetch_all<T>(&self, conn: &mut AnyConnection) -> MigrationResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        if self.ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = self.scope.rows_sql(&self.ids)?;
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(conn).await?)
    }

    /// Apply `SET <assignments>` to the batch's rows
    ///
    /// `assignments` is screened like `Scope::filter` conditions, so
    /// `"note = 'a -- b'"` is accepted while a trailing `-- ...` is not.
    pub async fn update_all(&self, conn: &mut AnyConnection, assignments: &str) -> MigrationResult<u64> {
        if self.ids.is_empty() {
            return Ok(0);
        }
        let sql = self.scope.update_sql(&self.ids, assignments)?;
        Ok(sqlx::query(&sql).execute(conn).await?.rows_affected())
    }

    /// Delete the batch's rows
    pub async fn delete_all(&self, conn: &mut AnyConnection) -> MigrationResult<u64> {
        if self.ids.is_empty() {
            return Ok(0);
        }
        let sql = self.scope.delete_sql(&self.ids)?;
        Ok(sqlx::query(&sql).execute(conn).await?.rows_affected())
    }
}
