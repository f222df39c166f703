//! Error types for lancedock-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for indexing and retrieval.
#[derive(Error, Debug)]
pub enum LanceError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is invalid.
    #[error("Invalid configuration: {message}. {hint}")]
    InvalidConfiguration {
        /// Description of the invalid configuration.
        message: String,
        /// Actionable hint on how to fix it.
        hint: String,
    },

    /// Failed to read the plugin configuration file.
    #[error("Config I/O error at `{path}`: {message}")]
    ConfigIo {
        /// Path to the config file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// Failed to parse the plugin configuration file.
    #[error("Config parse error at `{path}`: {message}")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Connecting to the database or opening a table failed.
    #[error("Failed to reach `{uri}`: {reason}")]
    Connection {
        /// The connection URI.
        uri: String,
        /// Reason for the failure.
        reason: String,
    },

    /// The table exists but the write mode requires that it does not.
    #[error("Table `{table}` already exists; use write mode `append` or `overwrite`.")]
    TableExists {
        /// The existing table.
        table: String,
    },

    /// Writing rows to a table failed.
    #[error("Failed to write to table `{table}`: {reason}")]
    Write {
        /// The target table.
        table: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Storage(lancedock_db::DbError),

    // =========================================================================
    // Embedding Errors
    // =========================================================================
    /// The embedder failed.
    #[error("Embedding failed with `{embedder}`: {reason}")]
    Embedding {
        /// Name of the embedder.
        embedder: String,
        /// Reason for the failure.
        reason: String,
    },

    // =========================================================================
    // Registry Errors
    // =========================================================================
    /// No component is registered under the given name.
    #[error("No {kind} registered as `{name}`.")]
    NotRegistered {
        /// Component kind ("retriever" or "indexer").
        kind: &'static str,
        /// The requested name.
        name: String,
    },

    /// A component with the same name is already registered.
    #[error("A {kind} named `{name}` is already registered.")]
    AlreadyRegistered {
        /// Component kind ("retriever" or "indexer").
        kind: &'static str,
        /// The duplicate name.
        name: String,
    },
}

impl LanceError {
    /// Create an embedding error.
    pub fn embedding(embedder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Embedding {
            embedder: embedder.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
            hint: hint.into(),
        }
    }
}

/// Result type alias for lancedock-core operations.
pub type LanceResult<T> = Result<T, LanceError>;
