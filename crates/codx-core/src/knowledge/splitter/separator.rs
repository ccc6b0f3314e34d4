//! Separator-based language-aware chunking.
//!
//! Middle strategy of the chain: no parsing, but splits preferentially at
//! the declaration keywords of the resolved language, so chunks still tend
//! to start at logical boundaries.

use super::ChunkStrategy;
use crate::config::MAX_CODE_CHUNK_CHARS;

/// Ordered split points for a language, most significant first.
fn separators_for(language: &str) -> Option<&'static [&'static str]> {
    let separators: &[&str] = match language {
        "rust" => &["\nimpl ", "\nfn ", "\npub fn ", "\nstruct ", "\nenum ", "\ntrait ", "\nmod ", "\n\n"],
        "python" => &["\nclass ", "\ndef ", "\nasync def ", "\n\n"],
        "javascript" | "typescript" => &["\nclass ", "\nfunction ", "\nexport ", "\nconst ", "\n\n"],
        "go" => &["\nfunc ", "\ntype ", "\nvar ", "\n\n"],
        "java" | "csharp" => &["\nclass ", "\npublic ", "\nprotected ", "\nprivate ", "\n\n"],
        "ruby" => &["\nclass ", "\nmodule ", "\ndef ", "\n\n"],
        "c" | "cpp" => &["\nstruct ", "\nvoid ", "\nstatic ", "\n\n"],
        "markdown" => &["\n# ", "\n## ", "\n### ", "\n\n"],
        _ => return None,
    };
    Some(separators)
}

/// Splits content recursively at language separators until every chunk fits
/// `max_chars`, then greedily re-merges adjacent pieces.
pub struct SeparatorChunker {
    max_chars: usize,
}

impl SeparatorChunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if text.len() <= self.max_chars {
            return vec![text.to_string()];
        }

        let Some((sep, rest)) = separators.split_first() else {
            // Out of separators: hard-cut at a char boundary near max_chars.
            return self.hard_split(text);
        };

        if !text.contains(sep) {
            return self.split_recursive(text, rest);
        }

        // Split keeping the separator attached to the following piece. The
        // search starts past the first character so a piece that begins with
        // the separator does not split into an empty head forever.
        let mut pieces = Vec::new();
        let mut remaining = text;
        loop {
            let skip = remaining.chars().next().map_or(0, |c| c.len_utf8());
            match remaining[skip..].find(sep).map(|p| p + skip) {
                Some(pos) => {
                    pieces.push(&remaining[..pos]);
                    remaining = &remaining[pos..];
                }
                None => break,
            }
        }
        pieces.push(remaining);

        pieces
            .into_iter()
            .flat_map(|piece| self.split_recursive(piece, rest))
            .collect()
    }

    fn hard_split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        for line in text.split_inclusive('\n') {
            if !current.is_empty() && current.len() + line.len() > self.max_chars {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(line);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        for piece in pieces {
            match merged.last_mut() {
                Some(last) if last.len() + piece.len() <= self.max_chars => {
                    last.push_str(&piece);
                }
                _ => merged.push(piece),
            }
        }
        merged
    }
}

impl Default for SeparatorChunker {
    fn default() -> Self {
        Self::new(MAX_CODE_CHUNK_CHARS)
    }
}

impl ChunkStrategy for SeparatorChunker {
    fn loader_type(&self) -> &'static str {
        "code"
    }

    fn split(&self, language: &str, content: &str) -> Option<Vec<String>> {
        let separators = separators_for(language)?;
        if content.trim().is_empty() {
            return None;
        }

        let pieces = self.split_recursive(content, separators);
        let chunks: Vec<String> = self
            .merge(pieces)
            .into_iter()
            .map(|c| c.trim_end().to_string())
            .filter(|c| !c.trim().is_empty())
            .collect();

        if chunks.is_empty() {
            None
        } else {
            Some(chunks)
        }
    }
}
