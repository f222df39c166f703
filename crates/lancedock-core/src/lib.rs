//! # lancedock-core
//!
//! LanceDB indexing and retrieval pipelines for generative AI frameworks.
//!
//! This crate turns the host framework's retriever and indexer abstractions
//! into vector table operations. It is consumed by the `lancedock` CLI and by
//! hosts that register the pipelines as named components.
//!
//! ## Main Types
//!
//! - [`LanceIndexer`] – embeds documents and writes them as rows
//! - [`LanceRetriever`] – embeds a query and rebuilds documents from hits
//! - [`LanceDbPlugin`] – registers both as `lancedb/<table>`
//! - [`LanceError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`config`] – table configuration and per-call options
//! - [`document`] – the document abstraction
//! - [`embedding`] – the embedder abstraction
//! - [`hasher`] – content-addressed row ids
//! - [`row`] – document/row mapping
//! - [`resolver`] – table existence and handles
//! - [`indexer`] / [`retriever`] – the pipelines
//! - [`registry`] – named components and the plugin
//!
//! ## Example
//!
//! ```ignore
//! use lancedock_core::{
//!     Document, IndexOptions, LanceDbPlugin, Registry, RetrieveOptions, TableConfig,
//! };
//! use std::sync::Arc;
//!
//! let plugin = LanceDbPlugin::new(Arc::new(my_embedder), vec![TableConfig::new(".db", "docs")]);
//! let mut registry = Registry::new();
//! plugin.register(&mut registry)?;
//!
//! registry
//!     .indexer("lancedb/docs")?
//!     .index(&[Document::from_text("hello")], &IndexOptions::default())
//!     .await?;
//! let docs = registry
//!     .retriever("lancedb/docs")?
//!     .retrieve(&Document::from_text("hi"), &RetrieveOptions::default())
//!     .await?;
//! ```

// Modules
pub mod config;
pub mod constants;
pub mod db_adapter;
pub mod document;
pub mod embedding;
pub mod errors;
pub mod hasher;
pub mod indexer;
pub mod registry;
pub mod resolver;
pub mod retriever;
pub mod row;

// Re-exports for convenience
pub use config::{
    IndexOptions, PluginConfig, ResolvedIndexOptions, ResolvedRetrieveOptions, RetrieveOptions,
    TableConfig, WriteMode,
};
pub use document::{Document, Metadata, Part};
pub use embedding::{Embedder, EmbedderRef, Embedding};
pub use errors::{LanceError, LanceResult};
pub use hasher::content_id;
pub use indexer::{IndexReport, LanceIndexer};
pub use registry::{
    indexer_name, registrations, retriever_name, Indexer, LanceDbPlugin, Registration, Registry,
    Retriever,
};
pub use resolver::{Connector, DefaultConnector, ResolvedTable, TableResolver};
pub use retriever::LanceRetriever;
pub use row::{map_row, map_rows, reconstruct_document};

// Storage types hosts need to name.
pub use lancedock_db::table::ColumnNames;
