//! Named component registry and the LanceDB plugin.
//!
//! The host looks components up by name. [`LanceDbPlugin::register`] adds one
//! retriever and one indexer per configured table, both named
//! `lancedb/<tableName>`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::{IndexOptions, RetrieveOptions, TableConfig};
use crate::constants::PLUGIN_NAMESPACE;
use crate::document::Document;
use crate::embedding::EmbedderRef;
use crate::errors::{LanceError, LanceResult};
use crate::indexer::{IndexReport, LanceIndexer};
use crate::retriever::LanceRetriever;

// ============================================================================
// Component Traits
// ============================================================================

/// Answers a query document with related documents.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve documents for `query`.
    async fn retrieve(
        &self,
        query: &Document,
        options: &RetrieveOptions,
    ) -> LanceResult<Vec<Document>>;
}

/// Stores documents for later retrieval.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Index `documents`.
    async fn index(
        &self,
        documents: &[Document],
        options: &IndexOptions,
    ) -> LanceResult<IndexReport>;
}

// ============================================================================
// Registry
// ============================================================================

const RETRIEVER: &str = "retriever";
const INDEXER: &str = "indexer";

/// Retrievers and indexers by name.
#[derive(Default)]
pub struct Registry {
    retrievers: BTreeMap<String, Arc<dyn Retriever>>,
    indexers: BTreeMap<String, Arc<dyn Indexer>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("retrievers", &self.retrievers.keys().collect::<Vec<_>>())
            .field("indexers", &self.indexers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a retriever under `name`.
    pub fn define_retriever(
        &mut self,
        name: impl Into<String>,
        retriever: Arc<dyn Retriever>,
    ) -> LanceResult<()> {
        insert_unique(&mut self.retrievers, RETRIEVER, name.into(), retriever)
    }

    /// Register an indexer under `name`.
    pub fn define_indexer(
        &mut self,
        name: impl Into<String>,
        indexer: Arc<dyn Indexer>,
    ) -> LanceResult<()> {
        insert_unique(&mut self.indexers, INDEXER, name.into(), indexer)
    }

    /// Look up a retriever.
    pub fn retriever(&self, name: &str) -> LanceResult<Arc<dyn Retriever>> {
        self.retrievers
            .get(name)
            .cloned()
            .ok_or_else(|| LanceError::NotRegistered {
                kind: RETRIEVER,
                name: name.to_string(),
            })
    }

    /// Look up an indexer.
    pub fn indexer(&self, name: &str) -> LanceResult<Arc<dyn Indexer>> {
        self.indexers
            .get(name)
            .cloned()
            .ok_or_else(|| LanceError::NotRegistered {
                kind: INDEXER,
                name: name.to_string(),
            })
    }

    /// Registered retriever names, sorted.
    pub fn retriever_names(&self) -> Vec<&str> {
        self.retrievers.keys().map(String::as_str).collect()
    }

    /// Registered indexer names, sorted.
    pub fn indexer_names(&self) -> Vec<&str> {
        self.indexers.keys().map(String::as_str).collect()
    }
}

fn insert_unique<T: ?Sized>(
    map: &mut BTreeMap<String, Arc<T>>,
    kind: &'static str,
    name: String,
    component: Arc<T>,
) -> LanceResult<()> {
    if map.contains_key(&name) {
        return Err(LanceError::AlreadyRegistered { kind, name });
    }
    debug!("Registered {} '{}'", kind, name);
    map.insert(name, component);
    Ok(())
}

// ============================================================================
// Names
// ============================================================================

/// Registry name of the retriever for `table_name`.
pub fn retriever_name(table_name: &str) -> String {
    format!("{}/{}", PLUGIN_NAMESPACE, table_name)
}

/// Registry name of the indexer for `table_name`.
pub fn indexer_name(table_name: &str) -> String {
    format!("{}/{}", PLUGIN_NAMESPACE, table_name)
}

/// One component the plugin registers for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// `"retriever"` or `"indexer"`.
    pub kind: &'static str,
    /// Registry name.
    pub name: String,
    /// Storage location of the table.
    pub db_uri: String,
}

/// The components registered for `tables`, retriever before indexer per table.
pub fn registrations(tables: &[TableConfig]) -> Vec<Registration> {
    tables
        .iter()
        .flat_map(|table| {
            [
                Registration {
                    kind: RETRIEVER,
                    name: retriever_name(&table.table_name),
                    db_uri: table.db_uri.clone(),
                },
                Registration {
                    kind: INDEXER,
                    name: indexer_name(&table.table_name),
                    db_uri: table.db_uri.clone(),
                },
            ]
        })
        .collect()
}

// ============================================================================
// LanceDbPlugin
// ============================================================================

/// Registers a retriever and an indexer per configured table.
#[derive(Clone)]
pub struct LanceDbPlugin {
    embedder: EmbedderRef,
    tables: Vec<TableConfig>,
}

impl fmt::Debug for LanceDbPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanceDbPlugin")
            .field("embedder", &self.embedder.name())
            .field("tables", &self.tables)
            .finish()
    }
}

impl LanceDbPlugin {
    /// Create a plugin for `tables`, all embedded with `embedder`.
    pub fn new(embedder: EmbedderRef, tables: Vec<TableConfig>) -> Self {
        Self { embedder, tables }
    }

    /// The configured tables.
    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }

    /// Register every table's retriever and indexer.
    ///
    /// # Errors
    ///
    /// Returns [`LanceError::AlreadyRegistered`] if a name is taken; tables
    /// before the duplicate stay registered.
    pub fn register(&self, registry: &mut Registry) -> LanceResult<()> {
        for table in &self.tables {
            let retriever = LanceRetriever::new(self.embedder.clone(), table.clone());
            registry.define_retriever(retriever_name(&table.table_name), Arc::new(retriever))?;

            let indexer = LanceIndexer::new(self.embedder.clone(), table.clone());
            registry.define_indexer(indexer_name(&table.table_name), Arc::new(indexer))?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::FixedEmbedder;

    fn plugin(tables: &[(&str, &str)]) -> LanceDbPlugin {
        let embedder = FixedEmbedder::new()
            .with("A", vec![1.0, 0.0])
            .with("B", vec![0.0, 1.0]);
        LanceDbPlugin::new(
            Arc::new(embedder),
            tables
                .iter()
                .map(|(uri, name)| TableConfig::new(*uri, *name))
                .collect(),
        )
    }

    #[test]
    fn test_names() {
        assert_eq!(retriever_name("docs"), "lancedb/docs");
        assert_eq!(indexer_name("docs"), "lancedb/docs");
    }

    #[test]
    fn test_register_names_per_table() {
        let mut registry = Registry::new();
        plugin(&[(".db", "docs"), (".db", "notes")])
            .register(&mut registry)
            .unwrap();

        assert_eq!(registry.retriever_names(), vec!["lancedb/docs", "lancedb/notes"]);
        assert_eq!(registry.indexer_names(), vec!["lancedb/docs", "lancedb/notes"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = Registry::new();
        plugin(&[(".db", "docs")]).register(&mut registry).unwrap();

        let err = plugin(&[("/other", "docs")])
            .register(&mut registry)
            .unwrap_err();
        assert!(matches!(
            err,
            LanceError::AlreadyRegistered { kind: "retriever", .. }
        ));
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = Registry::new();
        assert!(matches!(
            registry.retriever("lancedb/docs"),
            Err(LanceError::NotRegistered { kind: "retriever", .. })
        ));
        assert!(matches!(
            registry.indexer("lancedb/docs"),
            Err(LanceError::NotRegistered { kind: "indexer", .. })
        ));
    }

    #[test]
    fn test_registrations_listing() {
        let tables = vec![TableConfig::new("/data", "docs")];
        let listed = registrations(&tables);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].kind, "retriever");
        assert_eq!(listed[1].kind, "indexer");
        assert!(listed.iter().all(|r| r.name == "lancedb/docs" && r.db_uri == "/data"));
    }

    #[tokio::test]
    async fn test_registered_components_share_a_table() {
        let uri = "memory://registry-roundtrip";
        let mut registry = Registry::new();
        plugin(&[(uri, "docs")]).register(&mut registry).unwrap();

        let indexer = registry.indexer("lancedb/docs").unwrap();
        let report = indexer
            .index(
                &[Document::from_text("A"), Document::from_text("B")],
                &IndexOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(report.rows_written, 2);

        let retriever = registry.retriever("lancedb/docs").unwrap();
        let docs = retriever
            .retrieve(&Document::from_text("B"), &RetrieveOptions::default().with_k(1))
            .await
            .unwrap();
        assert_eq!(docs[0].text().as_deref(), Some("B"));
    }
}
