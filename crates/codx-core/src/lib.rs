//! Codx core: an incrementally-maintained knowledge index over a project
//! working copy, plus the protocol layer that turns LLM output into file
//! edits.
//!
//! # Components
//!
//! - [`knowledge::Knowledge`] — reload/prune/status cycle over a
//!   [`knowledge::VectorStore`] backend
//! - [`relevance::RelevanceValidator`] — concurrent LLM relevance filtering
//! - [`edit`] — before/after edit extraction and application
//! - [`mention`] — inline `@codx:` directive scanning
//! - [`scheduler::WatchScheduler`] — background reload polling
//!
//! The embedding/vector-store backend, the HTTP surface and conversation
//! management are external collaborators; this crate orchestrates indexing,
//! scoring and edit application around them.

pub mod chat;
pub mod config;
pub mod edit;
pub mod knowledge;
pub mod llm;
pub mod mention;
pub mod relevance;
pub mod scheduler;

pub use config::Config;
pub use edit::{apply_edits, parse_edits, Edit};
pub use knowledge::{Document, Knowledge, KnowledgeError, SearchType, VectorStore};
pub use llm::Llm;
pub use mention::{extract_mentions, Mention};
pub use relevance::RelevanceValidator;
pub use scheduler::WatchScheduler;
