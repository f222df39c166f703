//! Row, batch and search types shared by all table backends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DbError, DbResult};

// ============================================================================
// Constants
// ============================================================================

/// Name of the id column. Not configurable.
pub const ID_COLUMN: &str = "id";

/// Default vector column name.
pub const DEFAULT_VECTOR_COLUMN: &str = "vector";

/// Default text column name.
pub const DEFAULT_TEXT_COLUMN: &str = "text";

/// Default metadata column name.
pub const DEFAULT_METADATA_COLUMN: &str = "metadata";

// ============================================================================
// ColumnNames
// ============================================================================

/// Column names used for a table's vector, text and metadata columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnNames {
    /// Column holding the embedding.
    #[serde(default = "default_vector_column")]
    pub vector: String,

    /// Column holding the primary text.
    #[serde(default = "default_text_column")]
    pub text: String,

    /// Column holding JSON-serialized metadata.
    #[serde(default = "default_metadata_column")]
    pub metadata: String,
}

fn default_vector_column() -> String {
    DEFAULT_VECTOR_COLUMN.to_string()
}

fn default_text_column() -> String {
    DEFAULT_TEXT_COLUMN.to_string()
}

fn default_metadata_column() -> String {
    DEFAULT_METADATA_COLUMN.to_string()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            vector: default_vector_column(),
            text: default_text_column(),
            metadata: default_metadata_column(),
        }
    }
}

impl ColumnNames {
    /// Create column names.
    pub fn new(
        vector: impl Into<String>,
        text: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        Self {
            vector: vector.into(),
            text: text.into(),
            metadata: metadata.into(),
        }
    }

    /// The text and metadata columns as a set, in that order.
    ///
    /// If both names are identical only one column is returned.
    pub fn projection(&self) -> Vec<String> {
        let mut columns = vec![self.text.clone()];
        if self.metadata != self.text {
            columns.push(self.metadata.clone());
        }
        columns
    }
}

// ============================================================================
// StoredRow
// ============================================================================

/// A single row as it is written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    /// Content-derived identifier.
    pub id: String,

    /// The embedding vector.
    pub vector: Vec<f32>,

    /// Primary text of the source document.
    pub text: String,

    /// JSON-serialized metadata.
    pub metadata: String,
}

impl StoredRow {
    /// Create a new row.
    pub fn new(
        id: impl Into<String>,
        vector: Vec<f32>,
        text: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            vector,
            text: text.into(),
            metadata: metadata.into(),
        }
    }
}

// ============================================================================
// RowBatch
// ============================================================================

/// A batch of rows bound to the column names they are written under.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    /// Column layout for the batch.
    pub columns: ColumnNames,

    /// Rows in insertion order.
    pub rows: Vec<StoredRow>,
}

impl RowBatch {
    /// Create a batch.
    pub fn new(columns: ColumnNames, rows: Vec<StoredRow>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Common vector dimension of the batch.
    ///
    /// Returns `None` for an empty batch and an error if rows disagree.
    pub fn dimension(&self) -> DbResult<Option<usize>> {
        let Some(first) = self.rows.first() else {
            return Ok(None);
        };
        let expected = first.vector.len();
        for row in &self.rows[1..] {
            if row.vector.len() != expected {
                return Err(DbError::DimensionMismatch {
                    expected,
                    actual: row.vector.len(),
                });
            }
        }
        Ok(Some(expected))
    }
}

// ============================================================================
// SearchRequest / SearchHit
// ============================================================================

/// A nearest-neighbour search against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// The query vector.
    pub vector: Vec<f32>,

    /// Column the query vector is compared against.
    pub vector_column: String,

    /// Maximum number of hits.
    pub limit: usize,

    /// Filter expression, passed to the backend verbatim.
    pub filter: Option<String>,

    /// Columns to return for every hit.
    pub select: Vec<String>,
}

impl SearchRequest {
    /// Create a search request with no filter and no projection.
    pub fn new(vector: Vec<f32>, vector_column: impl Into<String>, limit: usize) -> Self {
        Self {
            vector,
            vector_column: vector_column.into(),
            limit,
            filter: None,
            select: Vec::new(),
        }
    }

    /// Narrow the search with a filter expression.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Project the hits onto the given columns.
    pub fn with_select(mut self, columns: Vec<String>) -> Self {
        self.select = columns;
        self
    }
}

/// One row returned by a search or scan, keyed by column name.
///
/// Only non-null string columns are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    /// Column values of the hit.
    pub columns: HashMap<String, String>,
}

impl SearchHit {
    /// Get a column value.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Set a column value.
    pub fn with_column(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
