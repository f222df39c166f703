//! Indexing pipeline.
//!
//! One call embeds a batch of documents, maps every embedding to a row and
//! writes the rows to a table:
//!
//! 1. An empty batch succeeds without connecting
//! 2. Documents are embedded concurrently; the first failure aborts the batch
//! 3. Embeddings are flattened into rows
//! 4. Zero rows succeeds without connecting
//! 5. The table is created if absent, otherwise written with the write mode

use async_trait::async_trait;
use futures::future::try_join_all;
use lancedock_db::table::{AddMode, RowBatch};
use lancedock_db::DbError;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{IndexOptions, TableConfig, WriteMode};
use crate::document::Document;
use crate::embedding::EmbedderRef;
use crate::errors::{LanceError, LanceResult};
use crate::registry::Indexer;
use crate::resolver::TableResolver;
use crate::row::map_rows;

// ============================================================================
// IndexReport
// ============================================================================

/// Outcome of one indexing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    /// Target table.
    pub table: String,
    /// Mode actually applied; `None` when nothing was written.
    pub mode: Option<WriteMode>,
    /// Number of rows written.
    pub rows_written: usize,
}

impl IndexReport {
    fn nothing_written(table: &str) -> Self {
        Self {
            table: table.to_string(),
            mode: None,
            rows_written: 0,
        }
    }
}

// ============================================================================
// LanceIndexer
// ============================================================================

/// Indexes documents into one configured table.
#[derive(Clone)]
pub struct LanceIndexer {
    embedder: EmbedderRef,
    config: TableConfig,
    resolver: TableResolver,
}

impl std::fmt::Debug for LanceIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanceIndexer")
            .field("embedder", &self.embedder.name())
            .field("config", &self.config)
            .finish()
    }
}

impl LanceIndexer {
    /// Create an indexer for the table described by `config`.
    pub fn new(embedder: EmbedderRef, config: TableConfig) -> Self {
        Self {
            embedder,
            config,
            resolver: TableResolver::default(),
        }
    }

    /// Use a different resolver.
    pub fn with_resolver(mut self, resolver: TableResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The registration-level configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Index `documents`.
    ///
    /// # Errors
    ///
    /// - [`LanceError::InvalidConfiguration`] if the options do not resolve
    /// - [`LanceError::Embedding`] if any document fails to embed
    /// - [`LanceError::Connection`] if the database cannot be reached
    /// - [`LanceError::TableExists`] for mode `create` on an existing table
    /// - [`LanceError::Write`] if the write fails
    /// - [`LanceError::Storage`] if an existing table cannot be opened
    pub async fn index(
        &self,
        documents: &[Document],
        options: &IndexOptions,
    ) -> LanceResult<IndexReport> {
        let resolved = self.config.resolve_index(options)?;
        let table_name = resolved.table_name.as_str();

        if documents.is_empty() {
            debug!("No documents to index into '{}'", table_name);
            return Ok(IndexReport::nothing_written(table_name));
        }

        debug!(
            "Embedding {} documents with '{}'",
            documents.len(),
            self.embedder.name()
        );
        let embedder_options = resolved.embedder_options.as_ref();
        let embeddings = try_join_all(
            documents
                .iter()
                .map(|document| self.embedder.embed(document, embedder_options)),
        )
        .await?;

        let rows: Vec<_> = documents
            .iter()
            .zip(embeddings.iter())
            .flat_map(|(document, embeddings)| map_rows(document, embeddings))
            .collect();

        if rows.is_empty() {
            debug!("Embedder produced no vectors, nothing to write to '{}'", table_name);
            return Ok(IndexReport::nothing_written(table_name));
        }

        let batch = RowBatch::new(resolved.columns.clone(), rows);
        let rows_written = batch.len();
        let target = self.resolver.resolve(&resolved.db_uri, table_name).await?;

        let mode = match &target.handle {
            None => {
                target
                    .db
                    .create_table(table_name, batch)
                    .await
                    .map_err(|e| write_error(table_name, e))?;
                WriteMode::Create
            }
            Some(table) => match resolved.write_mode {
                WriteMode::Create => {
                    return Err(LanceError::TableExists {
                        table: table_name.to_string(),
                    });
                }
                WriteMode::Overwrite => {
                    table
                        .add(batch, AddMode::Overwrite)
                        .await
                        .map_err(|e| write_error(table_name, e))?;
                    WriteMode::Overwrite
                }
                WriteMode::Append => {
                    table
                        .add(batch, AddMode::Append)
                        .await
                        .map_err(|e| write_error(table_name, e))?;
                    WriteMode::Append
                }
            },
        };

        info!(
            "Indexed {} rows into '{}' at '{}' (mode={})",
            rows_written, table_name, resolved.db_uri, mode
        );

        Ok(IndexReport {
            table: table_name.to_string(),
            mode: Some(mode),
            rows_written,
        })
    }
}

/// Wrap a storage failure during a write with the table name.
fn write_error(table: &str, err: DbError) -> LanceError {
    match err {
        DbError::TableExists { table } => LanceError::TableExists { table },
        DbError::Write { message, .. } => LanceError::Write {
            table: table.to_string(),
            reason: message,
        },
        other => LanceError::Write {
            table: table.to_string(),
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl Indexer for LanceIndexer {
    async fn index(
        &self,
        documents: &[Document],
        options: &IndexOptions,
    ) -> LanceResult<IndexReport> {
        LanceIndexer::index(self, documents, options).await
    }
}

// ============================================================================
// Tests
// ============================================================================
