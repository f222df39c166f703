//! Storage traits implemented by every table backend.
//!
//! A [`VectorDatabase`] is one connection (one URI); a [`VectorTable`] is a
//! handle to one named table inside it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::row::{RowBatch, SearchHit, SearchRequest};
use crate::error::DbResult;

// ============================================================================
// AddMode
// ============================================================================

/// How rows added to an existing table are merged with its current rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddMode {
    /// Keep existing rows and add the new ones.
    #[default]
    Append,
    /// Replace all existing rows with the new ones, keeping the table.
    Overwrite,
}

impl AddMode {
    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddMode::Append => "append",
            AddMode::Overwrite => "overwrite",
        }
    }
}

impl std::fmt::Display for AddMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// VectorDatabase
// ============================================================================

/// A connection to a vector database.
///
/// Implementations must be thread-safe and cheap to share behind an `Arc`.
#[async_trait]
pub trait VectorDatabase: Send + Sync {
    /// The URI this connection was opened with.
    fn uri(&self) -> &str;

    /// Names of all tables in the database.
    async fn table_names(&self) -> DbResult<Vec<String>>;

    /// Open an existing table.
    ///
    /// Returns [`DbError::TableNotFound`](crate::DbError::TableNotFound) when
    /// the table does not exist; other variants mean the open itself failed.
    async fn open_table(&self, name: &str) -> DbResult<Arc<dyn VectorTable>>;

    /// Create a table whose schema is inferred from the batch.
    ///
    /// Fails with [`DbError::TableExists`](crate::DbError::TableExists) if the
    /// table already exists and with
    /// [`DbError::EmptyBatch`](crate::DbError::EmptyBatch) if there are no rows.
    async fn create_table(&self, name: &str, batch: RowBatch) -> DbResult<Arc<dyn VectorTable>>;

    /// Check whether a table exists.
    async fn table_exists(&self, name: &str) -> DbResult<bool> {
        Ok(self.table_names().await?.iter().any(|n| n == name))
    }
}

// ============================================================================
// VectorTable
// ============================================================================

/// A handle to one named table.
#[async_trait]
pub trait VectorTable: Send + Sync {
    /// The table name.
    fn name(&self) -> &str;

    /// Add rows to the table.
    ///
    /// The batch's columns must be compatible with the table schema.
    async fn add(&self, batch: RowBatch, mode: AddMode) -> DbResult<()>;

    /// Run a nearest-neighbour search.
    ///
    /// Hits are ordered nearest first.
    async fn search(&self, request: &SearchRequest) -> DbResult<Vec<SearchHit>>;

    /// Read up to `limit` rows without a query vector, projected onto `select`.
    async fn scan(&self, limit: usize, select: &[String]) -> DbResult<Vec<SearchHit>>;

    /// Number of rows in the table.
    async fn count_rows(&self) -> DbResult<usize>;
}

// ============================================================================
// Tests
// ============================================================================
