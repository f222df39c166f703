//! Retrieval pipeline.
//!
//! A query document is embedded, its first vector is searched against the
//! table, and every hit is rebuilt into a document. Storage problems never
//! fail a retrieval: they are logged and an empty list is returned. Embedder
//! errors are returned to the caller.

use async_trait::async_trait;
use lancedock_db::table::SearchRequest;
use tracing::{debug, warn};

use crate::config::{RetrieveOptions, TableConfig};
use crate::document::Document;
use crate::embedding::EmbedderRef;
use crate::errors::LanceResult;
use crate::registry::Retriever;
use crate::resolver::TableResolver;
use crate::row::reconstruct_document;

/// Retrieves documents from one configured table.
#[derive(Clone)]
pub struct LanceRetriever {
    embedder: EmbedderRef,
    config: TableConfig,
    resolver: TableResolver,
}

impl std::fmt::Debug for LanceRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanceRetriever")
            .field("embedder", &self.embedder.name())
            .field("config", &self.config)
            .finish()
    }
}

impl LanceRetriever {
    /// Create a retriever for the table described by `config`.
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

    /// Return up to `k` documents nearest to `query`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::InvalidConfiguration`](crate::LanceError::InvalidConfiguration)
    /// if the options do not resolve and
    /// [`LanceError::Embedding`](crate::LanceError::Embedding) if the query
    /// cannot be embedded. Connection and search failures yield `Ok(vec![])`.
    pub async fn retrieve(
        &self,
        query: &Document,
        options: &RetrieveOptions,
    ) -> LanceResult<Vec<Document>> {
        let resolved = self.config.resolve_retrieve(options)?;
        let table_name = resolved.table_name.as_str();

        let table = match self.resolver.resolve(&resolved.db_uri, table_name).await {
            Ok(target) => match target.handle {
                Some(table) => table,
                None => {
                    warn!(
                        "Table '{}' not found at '{}', returning no results",
                        table_name, resolved.db_uri
                    );
                    return Ok(Vec::new());
                }
            },
            Err(e) => {
                warn!("Failed to open table '{}': {}", table_name, e);
                return Ok(Vec::new());
            }
        };

        let embeddings = self
            .embedder
            .embed(query, resolved.embedder_options.as_ref())
            .await?;
        let Some(vector) = embeddings.into_iter().next() else {
            debug!("Query produced no embedding, returning no results");
            return Ok(Vec::new());
        };

        let mut request = SearchRequest::new(vector, &resolved.columns.vector, resolved.k)
            .with_select(resolved.columns.projection());
        if let Some(filter) = &resolved.filter {
            request = request.with_filter(filter);
        }

        let hits = match table.search(&request).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search on table '{}' failed: {}", table_name, e);
                return Ok(Vec::new());
            }
        };

        debug!("Retrieved {} documents from '{}'", hits.len(), table_name);
        Ok(hits
            .iter()
            .map(|hit| reconstruct_document(hit, &resolved.columns))
            .collect())
    }
}

#[async_trait]
impl Retriever for LanceRetriever {
    async fn retrieve(
        &self,
        query: &Document,
        options: &RetrieveOptions,
    ) -> LanceResult<Vec<Document>> {
        LanceRetriever::retrieve(self, query, options).await
    }
}

// ============================================================================
// Tests
// ============================================================================
