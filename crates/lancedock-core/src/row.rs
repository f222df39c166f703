//! Mapping between documents and stored rows.
//!
//! - [`map_rows`] turns one document and its embeddings into rows for writing
//! - [`reconstruct_document`] turns a search hit back into a document
//!
//! Metadata problems never fail either direction: the metadata is replaced by
//! `{"error": "Failed to parse metadata"}` and processing continues.

use lancedock_db::table::{ColumnNames, SearchHit, StoredRow};
use serde_json::Value;
use tracing::warn;

use crate::constants::{EMPTY_METADATA_JSON, METADATA_ERROR_MESSAGE};
use crate::document::{Document, Metadata};
use crate::embedding::Embedding;
use crate::hasher::content_id;

/// The metadata that replaces unreadable or unwritable metadata.
pub fn metadata_error() -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(
        "error".to_string(),
        Value::String(METADATA_ERROR_MESSAGE.to_string()),
    );
    metadata
}

/// Serialize metadata for the metadata column.
pub fn serialize_metadata(metadata: &Metadata) -> String {
    match serde_json::to_string(metadata) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize document metadata: {}", e);
            Value::Object(metadata_error()).to_string()
        }
    }
}

/// Parse the metadata column of a stored row.
///
/// Anything that is not a JSON object yields [`metadata_error`].
pub fn parse_metadata(raw: &str) -> Metadata {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(metadata)) => metadata,
        Ok(other) => {
            warn!("Stored metadata is not a JSON object: {}", other);
            metadata_error()
        }
        Err(e) => {
            warn!("Failed to parse stored metadata: {}", e);
            metadata_error()
        }
    }
}

/// Text stored for a document: its text parts, or the whole document as JSON.
pub fn document_text(document: &Document) -> String {
    if let Some(text) = document.text() {
        return text;
    }
    serde_json::to_string(document).unwrap_or_else(|_| format!("{:?}", document))
}

/// Map one document and one embedding to a row.
///
/// `chunk` is appended to the content id as `-{chunk}` when set.
pub fn map_row(document: &Document, embedding: &[f32], chunk: Option<usize>) -> StoredRow {
    let text = document_text(document);
    let metadata = serialize_metadata(&document.metadata);
    let base_id = content_id(&text, &metadata);
    let id = match chunk {
        Some(index) => format!("{}-{}", base_id, index),
        None => base_id,
    };

    StoredRow::new(id, embedding.to_vec(), text, metadata)
}

/// Map a document and every embedding produced for it to rows.
///
/// A single embedding keeps the bare content id; several embeddings get a
/// chunk index suffix each so their ids stay distinct.
pub fn map_rows(document: &Document, embeddings: &[Embedding]) -> Vec<StoredRow> {
    let chunked = embeddings.len() > 1;
    embeddings
        .iter()
        .enumerate()
        .map(|(index, embedding)| map_row(document, embedding, chunked.then_some(index)))
        .collect()
}

/// Rebuild a document from a search hit.
///
/// A missing text column reads as `""` and missing metadata as `{}`.
pub fn reconstruct_document(hit: &SearchHit, columns: &ColumnNames) -> Document {
    let text = hit.get(&columns.text).unwrap_or_default();
    let metadata = parse_metadata(hit.get(&columns.metadata).unwrap_or(EMPTY_METADATA_JSON));
    Document::from_text(text).with_metadata(metadata)
}

// ============================================================================
// Tests
// ============================================================================
