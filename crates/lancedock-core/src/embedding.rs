//! Embedder abstraction.
//!
//! The host framework owns the embedding models; the pipelines only see the
//! [`Embedder`] trait. An embedder may return several vectors for one
//! document (e.g. when it chunks internally) or none at all.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;
use crate::errors::LanceResult;

/// An embedding vector. Dimensionality is the embedder's business.
pub type Embedding = Vec<f32>;

/// Shared handle to an embedder.
pub type EmbedderRef = Arc<dyn Embedder>;

/// Converts documents into embedding vectors.
///
/// Implementations must be `Send + Sync`; the indexing pipeline issues one
/// request per document concurrently.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Name of the embedder, for logs and errors.
    fn name(&self) -> &str;

    /// Embed one document.
    ///
    /// `options` is passed through from the table configuration untouched.
    async fn embed(&self, document: &Document, options: Option<&Value>)
        -> LanceResult<Vec<Embedding>>;
}

// ============================================================================
// Test Embedders
// ============================================================================

/// Deterministic embedders for pipeline tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::errors::LanceError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns fixed vectors per document text; unknown texts embed to nothing.
    #[derive(Default)]
    pub struct FixedEmbedder {
        vectors: HashMap<String, Vec<Embedding>>,
        fail_on: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Embed `text` to a single vector.
        pub fn with(mut self, text: &str, vector: Embedding) -> Self {
            self.vectors.insert(text.to_string(), vec![vector]);
            self
        }

        /// Embed `text` to several vectors.
        pub fn with_many(mut self, text: &str, vectors: Vec<Embedding>) -> Self {
            self.vectors.insert(text.to_string(), vectors);
            self
        }

        /// Fail when asked to embed `text`.
        pub fn failing_on(mut self, text: &str) -> Self {
            self.fail_on = Some(text.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn embed(
            &self,
            document: &Document,
            _options: Option<&Value>,
        ) -> LanceResult<Vec<Embedding>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = document.text().unwrap_or_default();
            if self.fail_on.as_deref() == Some(text.as_str()) {
                return Err(LanceError::embedding("fixed", format!("refused '{}'", text)));
            }
            Ok(self.vectors.get(&text).cloned().unwrap_or_default())
        }
    }
}
