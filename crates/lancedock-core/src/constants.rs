//! Common constants used throughout lancedock-core.
//!
//! Defaults for every table option live here so that configuration,
//! pipelines and the CLI agree on them.

// ============================================================================
// Table Defaults
// ============================================================================

/// Default connection URI.
pub const DEFAULT_DB_URI: &str = ".db";

/// Default table name.
pub const DEFAULT_TABLE_NAME: &str = "table";

/// Default number of results returned by a retrieval.
pub const DEFAULT_K: usize = 5;

pub use lancedock_db::table::{
    DEFAULT_METADATA_COLUMN, DEFAULT_TEXT_COLUMN, DEFAULT_VECTOR_COLUMN,
};

// ============================================================================
// Registry
// ============================================================================

/// Namespace for registered retrievers and indexers (`lancedb/<table>`).
pub const PLUGIN_NAMESPACE: &str = "lancedb";

// ============================================================================
// Metadata
// ============================================================================

/// Message stored in place of metadata that could not be (de)serialized.
pub const METADATA_ERROR_MESSAGE: &str = "Failed to parse metadata";

/// Metadata column value read when a row carries none.
pub const EMPTY_METADATA_JSON: &str = "{}";

// ============================================================================
// Configuration Files
// ============================================================================

/// The name of the global lancedock configuration directory (`~/.lancedock`).
pub const LANCEDOCK_HOME_DIR: &str = ".lancedock";

/// The plugin configuration file inside [`LANCEDOCK_HOME_DIR`].
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Environment variable that overrides the configuration file path.
pub const CONFIG_ENV: &str = "LANCEDOCK_CONFIG";
