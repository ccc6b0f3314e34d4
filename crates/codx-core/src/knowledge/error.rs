//! Knowledge index error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the knowledge index.
///
/// Per-file enumeration and splitting problems are logged and skipped rather
/// than surfaced here; the variants below are the failures callers see.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Vector store backend unreachable or failing. The single terminal
    /// failure mode of reload/query.
    #[error("Vector store error: {0}")]
    Store(String),

    /// IO error on the status cache or other index-owned files.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KnowledgeError {
    /// IO error annotated with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
