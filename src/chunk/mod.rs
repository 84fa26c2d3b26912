//! Retrieval-ready chunks
//!
//! Both the code path ([`CodeMerger`]) and the documentation path
//! ([`DocumentSegmenter`]) produce [`SemanticChunk`]s of the same shape.

pub mod code;
pub mod doc;

pub use code::CodeMerger;
pub use doc::DocumentSegmenter;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar metadata value attached to a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Integer(i) => write!(f, "{}", i),
            MetadataValue::Text(s) => write!(f, "{}", s),
        }
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// Origin of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Code,
    Doc,
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkKind::Code => write!(f, "code"),
            ChunkKind::Doc => write!(f, "doc"),
        }
    }
}

/// A bounded text record ready for embedding.
///
/// `content` is never empty; producers drop empty text instead of emitting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticChunk {
    /// Upsert key, stable for unchanged input
    pub id: String,
    /// Text to embed
    pub content: String,
    /// Code or documentation
    pub chunk_kind: ChunkKind,
    /// Source, language or file type, ordinal and friends
    pub metadata: Metadata,
}

impl SemanticChunk {
    pub fn new(id: String, content: String, chunk_kind: ChunkKind) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("type".to_string(), chunk_kind.to_string().into());
        metadata.insert(
            "content_hash".to_string(),
            crate::extract::content_hash(&content).into(),
        );

        Self {
            id,
            content,
            chunk_kind,
            metadata,
        }
    }

    /// Builder-style metadata insert
    pub fn with_meta(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Metadata value by key
    pub fn meta(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }
}
