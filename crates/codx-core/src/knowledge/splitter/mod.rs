//! Document splitting.
//!
//! A file becomes documents through an ordered chain of chunking strategies;
//! the first strategy that produces chunks wins. Strategies signal "not
//! applicable" or "failed" the same way, by returning `None`, so a parse
//! error on one rung just falls through to the next.

mod code;
pub mod languages;
mod separator;
mod text;

pub use code::CodeChunker;
pub use separator::SeparatorChunker;
pub use text::TextChunker;

use std::fs;
use std::path::Path;

use tracing::debug;

use super::document::Document;

/// One rung of the splitting chain.
pub trait ChunkStrategy: Send + Sync {
    /// Loader type recorded on produced documents ("code" or "text").
    fn loader_type(&self) -> &'static str;

    /// Split content into chunks, or `None` when this strategy does not
    /// apply or fails.
    fn split(&self, language: &str, content: &str) -> Option<Vec<String>>;
}

/// Ordered first-success-wins splitting chain.
pub struct DocumentSplitter {
    strategies: Vec<Box<dyn ChunkStrategy>>,
}

impl DocumentSplitter {
    /// Default chain: structural code splitter, separator splitter, then the
    /// fixed-size text fallback.
    pub fn new(chunk_size_tokens: usize) -> Self {
        Self {
            strategies: vec![
                Box::new(CodeChunker::default()),
                Box::new(SeparatorChunker::default()),
                Box::new(TextChunker::new(chunk_size_tokens)),
            ],
        }
    }

    /// Build a splitter with an explicit strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn ChunkStrategy>>) -> Self {
        Self { strategies }
    }

    /// Split one file into documents. Unreadable or binary files yield
    /// nothing; this is never an error.
    pub fn split_file(&self, path: &Path) -> Vec<Document> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable file");
                return Vec::new();
            }
        };

        let language = languages::language_for_path(path).unwrap_or("txt");
        self.split_content(&path.to_string_lossy(), language, &content)
    }

    /// Split already-read content into documents.
    pub fn split_content(&self, source: &str, language: &str, content: &str) -> Vec<Document> {
        for strategy in &self.strategies {
            if let Some(chunks) = strategy.split(language, content) {
                if chunks.is_empty() {
                    continue;
                }
                return chunks
                    .into_iter()
                    .enumerate()
                    .map(|(ix, chunk)| {
                        Document::new(source, language, chunk, ix)
                            .with_loader_type(strategy.loader_type())
                    })
                    .collect();
            }
        }
        Vec::new()
    }
}

impl Default for DocumentSplitter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CHUNK_SIZE_TOKENS)
    }
}
