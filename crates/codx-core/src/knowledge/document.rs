//! Indexable document chunks and their metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One indexable unit of content derived from a source file.
///
/// A source file maps to zero or more documents (its chunks); every chunk of
/// a source shares the same `source` and `language`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier within the index.
    pub id: String,
    /// Absolute path of the source file this chunk came from.
    pub source: String,
    /// Language resolved from the source extension ("txt" when unknown).
    pub language: String,
    /// The chunk content.
    pub content: String,
    /// Position of this chunk within its source.
    pub chunk_index: usize,
    /// Well-known metadata plus open-ended tags.
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a new document chunk with a fresh id.
    pub fn new(
        source: impl Into<String>,
        language: impl Into<String>,
        content: impl Into<String>,
        chunk_index: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            language: language.into(),
            content: content.into(),
            chunk_index,
            metadata: DocumentMetadata::default(),
        }
    }

    /// Set the loader type that produced this chunk.
    pub fn with_loader_type(mut self, loader_type: impl Into<String>) -> Self {
        self.metadata.loader_type = loader_type.into();
        self
    }
}

/// Document metadata: fixed fields for the well-known tags plus a small
/// string-keyed map for optional extras (keywords and the like).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Which chunking strategy produced the document ("code" or "text").
    pub loader_type: String,
    /// Relevance score assigned by the validator, if scored.
    pub relevance_score: Option<f32>,
    /// When the document was indexed.
    pub index_date: Option<DateTime<Utc>>,
    /// Open-ended tags.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Distinct source paths of a document set, first-seen order preserved.
pub fn distinct_sources(documents: &[Document]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    documents
        .iter()
        .filter(|d| seen.insert(d.source.clone()))
        .map(|d| d.source.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ids_unique() {
        let a = Document::new("/p/a.rs", "rust", "fn a() {}", 0);
        let b = Document::new("/p/a.rs", "rust", "fn b() {}", 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_distinct_sources_preserves_order() {
        let docs = vec![
            Document::new("/p/b.rs", "rust", "x", 0),
            Document::new("/p/a.rs", "rust", "y", 0),
            Document::new("/p/b.rs", "rust", "z", 1),
        ];
        assert_eq!(distinct_sources(&docs), vec!["/p/b.rs", "/p/a.rs"]);
    }
}
