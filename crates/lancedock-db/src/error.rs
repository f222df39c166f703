//! Error types for lancedock-db.

use thiserror::Error;

/// Result type alias for lancedock-db operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in lancedock-db operations.
#[derive(Debug, Error)]
pub enum DbError {
    // ========================================================================
    // Connection errors
    // ========================================================================
    /// Failed to connect to the database at `uri`.
    #[error("Failed to connect to '{uri}': {message}")]
    Connect { uri: String, message: String },

    /// No backend handles the given URI.
    #[error("No storage backend available for '{uri}': {reason}")]
    UnsupportedBackend { uri: String, reason: String },

    // ========================================================================
    // Table errors
    // ========================================================================
    /// The table does not exist.
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// The table already exists.
    #[error("Table '{table}' already exists")]
    TableExists { table: String },

    /// Vector dimension mismatch inside one batch or against the table.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A table cannot be created from an empty batch (no schema to infer).
    #[error("Cannot create table '{table}' from an empty batch")]
    EmptyBatch { table: String },

    /// Writing rows failed.
    #[error("Write to table '{table}' failed: {message}")]
    Write { table: String, message: String },

    /// Query execution failed.
    #[error("Query on table '{table}' failed: {message}")]
    Query { table: String, message: String },

    /// The backend cannot evaluate filter expressions.
    #[error("Backend '{backend}' does not support filter expressions: {filter}")]
    UnsupportedFilter { backend: String, filter: String },

    /// LanceDB error.
    #[cfg(feature = "lancedb")]
    #[error("LanceDB error: {message}")]
    LanceDb { message: String },

    /// Arrow conversion error.
    #[cfg(feature = "lancedb")]
    #[error("Arrow error: {message}")]
    Arrow { message: String },

    // ========================================================================
    // General errors
    // ========================================================================
    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connect error.
    pub fn connect(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Create a table-not-found error.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    /// Create a write error.
    pub fn write(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error means the table is absent, as opposed to unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }
}

#[cfg(feature = "lancedb")]
impl From<lancedb::Error> for DbError {
    fn from(err: lancedb::Error) -> Self {
        match err {
            lancedb::Error::TableNotFound { name, .. } => Self::TableNotFound { table: name },
            lancedb::Error::TableAlreadyExists { name, .. } => Self::TableExists { table: name },
            other => Self::LanceDb {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(feature = "lancedb")]
impl From<arrow_schema::ArrowError> for DbError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        Self::Arrow {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        assert!(DbError::table_not_found("docs").is_not_found());
        assert!(!DbError::connect("s3://bucket", "timeout").is_not_found());
        assert!(!DbError::write("docs", "schema mismatch").is_not_found());
    }

    #[test]
    fn test_write_error_names_table() {
        let err = DbError::write("docs", "schema mismatch");
        assert_eq!(
            err.to_string(),
            "Write to table 'docs' failed: schema mismatch"
        );
    }
}
