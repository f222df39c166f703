//! Documents exchanged with the host framework.
//!
//! A [`Document`] is a list of content [`Part`]s plus a metadata map. The core
//! only ever reads documents; retrieval builds new ones.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to a document: string keys, arbitrary JSON values.
pub type Metadata = Map<String, Value>;

/// One piece of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    /// Plain text.
    Text(String),
    /// A reference to media content.
    #[serde(rename_all = "camelCase")]
    Media {
        /// Location of the media (URL or data URI).
        url: String,
        /// MIME type, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },
    /// Structured data.
    Data(Value),
}

/// A document: content parts and metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Content parts, in order.
    pub content: Vec<Part>,

    /// Document metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Create a document from content parts and metadata.
    pub fn new(content: Vec<Part>, metadata: Metadata) -> Self {
        Self { content, metadata }
    }

    /// Create a single-part text document with no metadata.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Part::Text(text.into())],
            metadata: Metadata::new(),
        }
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Concatenated text parts, or `None` if the document has no text part.
    pub fn text(&self) -> Option<String> {
        let mut texts = self.content.iter().filter_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            _ => None,
        });
        let first = texts.next()?;
        Some(texts.fold(first.to_string(), |mut acc, text| {
            acc.push_str(text);
            acc
        }))
    }
}
