//! Table backend implementations.
//!
//! ## Available Backends
//!
//! - `lancedb` (default): LanceDB on a local path or object store URI
//! - `memory`: process-local tables for tests, selected by `memory://` URIs

#[cfg(feature = "lancedb")]
mod lancedb;

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "lancedb")]
pub use self::lancedb::{LanceDbDatabase, LanceDbTable};

#[cfg(feature = "memory")]
pub use memory::{MemoryDatabase, MemoryTable, MEMORY_SCHEME};

use super::traits::VectorDatabase;
use crate::error::{DbError, DbResult};
use std::sync::Arc;
use tracing::debug;

/// Connect to the database at `uri`.
///
/// `memory://` URIs go to the in-memory backend; everything else goes to
/// LanceDB.
///
/// # Errors
///
/// Returns an error if:
/// - The backend for the URI is not compiled in
/// - The connection cannot be established
pub async fn connect(uri: &str) -> DbResult<Arc<dyn VectorDatabase>> {
    debug!("Connecting to '{}'", uri);

    if uri.starts_with("memory://") {
        #[cfg(feature = "memory")]
        {
            let db = MemoryDatabase::connect(uri)?;
            return Ok(Arc::new(db));
        }

        #[cfg(not(feature = "memory"))]
        {
            return Err(DbError::UnsupportedBackend {
                uri: uri.to_string(),
                reason: "the 'memory' feature is not enabled".to_string(),
            });
        }
    }

    #[cfg(feature = "lancedb")]
    {
        let db = LanceDbDatabase::connect(uri).await?;
        Ok(Arc::new(db))
    }

    #[cfg(not(feature = "lancedb"))]
    {
        Err(DbError::UnsupportedBackend {
            uri: uri.to_string(),
            reason: format!(
                "the 'lancedb' feature is not enabled. Available backends: {}",
                available_backends().join(", ")
            ),
        })
    }
}

/// Get a list of available backend names.
#[allow(clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<&'static str> {
    let mut backends = Vec::new();

    #[cfg(feature = "lancedb")]
    backends.push("lancedb");

    #[cfg(feature = "memory")]
    backends.push("memory");

    backends
}

// ============================================================================
// Tests
// ============================================================================
