//! Narrow interface to the external embedding/vector store.
//!
//! The backend (embedding model, persistence, similarity search) lives
//! outside this crate; the indexing core only needs these five operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::document::Document;
use super::error::KnowledgeError;

/// Vector store search strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Plain cosine-similarity ranking.
    Similarity,
    /// Maximal marginal relevance.
    #[default]
    Mmr,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Similarity => write!(f, "similarity"),
            Self::Mmr => write!(f, "mmr"),
        }
    }
}

/// Aggregate counts reported by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStatus {
    /// Number of document chunks in the index.
    pub doc_count: usize,
    /// Number of distinct source files.
    pub file_count: usize,
    /// Distinct folders containing indexed sources.
    pub folders: Vec<String>,
}

/// Interface to the external embedding/vector store.
///
/// Contract: callers must delete by source before re-adding the same
/// source's chunks, or the index accumulates duplicates. The store is not
/// assumed safe for concurrent writers; [`super::Knowledge`] issues all
/// writes from a single logical writer.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert documents into the index.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<(), KnowledgeError>;

    /// Delete every document whose source is in `sources`.
    async fn delete_by_sources(&self, sources: &[String]) -> Result<(), KnowledgeError>;

    /// Ranked query for the `k` most relevant documents.
    async fn search(
        &self,
        query: &str,
        k: usize,
        search_type: SearchType,
    ) -> Result<Vec<Document>, KnowledgeError>;

    /// Distinct source paths currently present in the index.
    async fn list_sources(&self) -> Result<Vec<String>, KnowledgeError>;

    /// Aggregate counts.
    async fn status(&self) -> Result<IndexStatus, KnowledgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_serde() {
        assert_eq!(
            serde_json::to_string(&SearchType::Similarity).unwrap(),
            "\"similarity\""
        );
        let parsed: SearchType = serde_json::from_str("\"mmr\"").unwrap();
        assert_eq!(parsed, SearchType::Mmr);
    }

    #[test]
    fn test_search_type_default_is_mmr() {
        assert_eq!(SearchType::default(), SearchType::Mmr);
    }
}
