//! Fixed-size text chunking, the universal fallback.

use super::ChunkStrategy;
use crate::config::DEFAULT_CHUNK_SIZE_TOKENS;

/// Approximate characters per token, for token estimation without a
/// tokenizer dependency.
const CHARS_PER_TOKEN: usize = 4;

/// Splits content into ~`chunk_size` token chunks along line boundaries,
/// with no overlap. Succeeds for any non-empty input.
pub struct TextChunker {
    chunk_size_tokens: usize,
}

impl TextChunker {
    pub fn new(chunk_size_tokens: usize) -> Self {
        Self { chunk_size_tokens }
    }

    fn estimate_tokens(text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE_TOKENS)
    }
}

impl ChunkStrategy for TextChunker {
    fn loader_type(&self) -> &'static str {
        "text"
    }

    fn split(&self, _language: &str, content: &str) -> Option<Vec<String>> {
        if content.trim().is_empty() {
            return None;
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for line in content.lines() {
            // A single line longer than the chunk size still becomes one chunk.
            if !current.is_empty()
                && Self::estimate_tokens(&current) + Self::estimate_tokens(line)
                    > self.chunk_size_tokens
            {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(line);
            current.push('\n');
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }

        Some(chunks.into_iter().map(|c| c.trim_end().to_string()).collect())
    }
}
