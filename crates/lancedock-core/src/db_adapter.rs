//! Adapter layer for lancedock-db errors.
//!
//! Storage failures that the pipelines report with their own meaning
//! (unreachable store, existing table, failed write) are mapped to dedicated
//! [`LanceError`] variants; everything else is wrapped as
//! [`LanceError::Storage`].

use lancedock_db::{DbError, DbResult};

use crate::errors::LanceError;

// ============================================================================
// Error Conversion
// ============================================================================

/// Convert a lancedock-db error to a lancedock-core error.
pub fn from_db_error(err: DbError) -> LanceError {
    match err {
        DbError::Connect { uri, message } => LanceError::Connection {
            uri,
            reason: message,
        },

        DbError::UnsupportedBackend { uri, reason } => LanceError::Connection { uri, reason },

        DbError::TableExists { table } => LanceError::TableExists { table },

        DbError::Write { table, message } => LanceError::Write {
            table,
            reason: message,
        },

        other => LanceError::Storage(other),
    }
}

/// Extension trait to convert DbResult to Result<T, LanceError>.
pub trait IntoLanceResult<T> {
    /// Convert a DbResult to a LanceError result.
    fn into_lance_result(self) -> Result<T, LanceError>;
}

impl<T> IntoLanceResult<T> for DbResult<T> {
    fn into_lance_result(self) -> Result<T, LanceError> {
        self.map_err(from_db_error)
    }
}
