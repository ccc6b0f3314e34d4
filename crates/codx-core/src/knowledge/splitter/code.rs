//! Structural code chunking.
//!
//! First strategy of the chain: chunks are aligned to the logical units of
//! the file (functions, types, impl blocks). Rust is parsed with `syn`; the
//! other supported languages go through tree-sitter. Anything that fails to
//! parse is "no result" so the chain can fall through.

use syn::spanned::Spanned;
use tree_sitter::{Language, Parser};

use super::ChunkStrategy;
use crate::config::MAX_CODE_CHUNK_CHARS;

/// Splits source files at the boundaries of their top-level logical units,
/// merging adjacent small units up to `max_chars`.
pub struct CodeChunker {
    max_chars: usize,
}

impl CodeChunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    fn ts_language(language: &str) -> Option<Language> {
        let lang: Language = match language {
            "python" => tree_sitter_python::LANGUAGE.into(),
            "javascript" => tree_sitter_javascript::LANGUAGE.into(),
            "typescript" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            "go" => tree_sitter_go::LANGUAGE.into(),
            "java" => tree_sitter_java::LANGUAGE.into(),
            "csharp" => tree_sitter_c_sharp::LANGUAGE.into(),
            _ => return None,
        };
        Some(lang)
    }

    /// Byte offsets where top-level named nodes start.
    fn ts_boundaries(language: Language, content: &str) -> Option<Vec<usize>> {
        let mut parser = Parser::new();
        parser.set_language(&language).ok()?;
        let tree = parser.parse(content, None)?;
        let root = tree.root_node();
        if root.has_error() {
            return None;
        }

        let mut cursor = root.walk();
        let boundaries: Vec<usize> = root
            .named_children(&mut cursor)
            .map(|n| n.start_byte())
            .collect();

        if boundaries.is_empty() {
            None
        } else {
            Some(boundaries)
        }
    }

    /// Byte offsets where top-level Rust items start, via syn spans.
    fn rust_boundaries(content: &str) -> Option<Vec<usize>> {
        let file = syn::parse_file(content).ok()?;
        if file.items.is_empty() {
            return None;
        }

        // Spans are line/column; map item start lines back to byte offsets.
        let line_offsets: Vec<usize> = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let mut boundaries = Vec::new();
        for item in &file.items {
            let line = item.span().start().line; // 1-based
            if let Some(&offset) = line_offsets.get(line.saturating_sub(1)) {
                boundaries.push(offset);
            }
        }
        boundaries.dedup();

        if boundaries.is_empty() {
            None
        } else {
            Some(boundaries)
        }
    }

    /// Cut content at unit boundaries, attach leading trivia to the first
    /// unit, then merge adjacent segments up to `max_chars`.
    fn chunks_from_boundaries(&self, content: &str, mut boundaries: Vec<usize>) -> Vec<String> {
        boundaries.sort_unstable();
        if boundaries.first() != Some(&0) {
            boundaries.insert(0, 0);
        }
        boundaries.push(content.len());

        let mut chunks: Vec<String> = Vec::new();
        for window in boundaries.windows(2) {
            let segment = &content[window[0]..window[1]];
            if segment.trim().is_empty() {
                continue;
            }
            match chunks.last_mut() {
                Some(last) if last.len() + segment.len() <= self.max_chars => {
                    last.push_str(segment);
                }
                _ => chunks.push(segment.to_string()),
            }
        }

        chunks
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

impl Default for CodeChunker {
    fn default() -> Self {
        Self::new(MAX_CODE_CHUNK_CHARS)
    }
}

impl ChunkStrategy for CodeChunker {
    fn loader_type(&self) -> &'static str {
        "code"
    }

    fn split(&self, language: &str, content: &str) -> Option<Vec<String>> {
        let boundaries = if language == "rust" {
            Self::rust_boundaries(content)?
        } else {
            let lang = Self::ts_language(language)?;
            Self::ts_boundaries(lang, content)?
        };

        let chunks = self.chunks_from_boundaries(content, boundaries);
        if chunks.is_empty() {
            None
        } else {
            Some(chunks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_items_split() {
        let chunker = CodeChunker::new(40);
        let content = "fn alpha() -> u32 {\n    1\n}\n\nfn beta() -> u32 {\n    2\n}\n";
        let chunks = chunker.split("rust", content).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("fn alpha"));
        assert!(chunks[1].starts_with("fn beta"));
    }

    #[test]
    fn test_rust_small_items_merge() {
        let chunker = CodeChunker::default();
        let content = "fn a() {}\nfn b() {}\nfn c() {}\n";
        let chunks = chunker.split("rust", content).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_invalid_rust_is_no_result() {
        let chunker = CodeChunker::default();
        assert!(chunker.split("rust", "fn broken( {").is_none());
    }

    #[test]
    fn test_python_defs_split() {
        let chunker = CodeChunker::new(40);
        let content = "def alpha():\n    return 1\n\ndef beta():\n    return 2\n";
        let chunks = chunker.split("python", content).unwrap();

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().any(|c| c.contains("def alpha")));
        assert!(chunks.iter().any(|c| c.contains("def beta")));
    }

    #[test]
    fn test_unsupported_language_is_no_result() {
        let chunker = CodeChunker::default();
        assert!(chunker.split("markdown", "# Title\n\ntext").is_none());
    }
}
