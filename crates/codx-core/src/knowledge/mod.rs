//! Incrementally-maintained knowledge index of a project working copy.
//!
//! [`Knowledge`] orchestrates the reload cycle: enumerate candidate sources,
//! split them into [`Document`] chunks, replace their chunks in the vector
//! store (delete-then-insert, never an incremental chunk diff), prune
//! documents whose backing file is gone, and rewrite the on-disk status
//! cache. The vector store itself is an external collaborator behind the
//! [`VectorStore`] trait.

pub mod document;
mod enrich;
mod error;
mod loader;
pub mod splitter;
mod store;

pub use document::{distinct_sources, Document, DocumentMetadata};
pub use enrich::Enricher;
pub use error::KnowledgeError;
pub use loader::SourceLoader;
pub use splitter::{ChunkStrategy, DocumentSplitter};
pub use store::{IndexStatus, SearchType, VectorStore};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{KnowledgeConfig, STATUS_CACHE_FILE};

/// Mutable index state. The known source set is deliberately absent: it is
/// always derived from [`VectorStore::list_sources`], never hand-maintained.
#[derive(Debug, Default)]
struct IndexState {
    last_update: Option<DateTime<Utc>>,
}

/// Snapshot returned by [`Knowledge::status`].
#[derive(Debug, Clone)]
pub struct KnowledgeStatus {
    pub last_update: Option<DateTime<Utc>>,
    /// Files the next reload would (re)index.
    pub pending_files: Vec<PathBuf>,
    /// Aggregate counts from the vector store.
    pub index: IndexStatus,
}

/// The knowledge index for one project root.
pub struct Knowledge<S: VectorStore> {
    root: PathBuf,
    store: S,
    config: KnowledgeConfig,
    splitter: DocumentSplitter,
    enricher: Option<Enricher>,
    // Also serializes store writes: reload holds this across its whole cycle,
    // so the store only ever sees a single logical writer.
    state: Mutex<IndexState>,
}

impl<S: VectorStore> Knowledge<S> {
    /// Create a knowledge index rooted at `root`.
    ///
    /// The last-update timestamp is recovered from the status cache file's
    /// mtime, so a restart does not trigger a full re-scan.
    pub fn new(root: impl Into<PathBuf>, store: S, config: KnowledgeConfig) -> Self {
        let root: PathBuf = root.into();
        let root = fs::canonicalize(&root).unwrap_or(root);
        let splitter = DocumentSplitter::new(config.chunk_size_tokens);
        let last_update = status_cache_mtime(&status_cache_path(&root, &config));

        Self {
            root,
            store,
            config,
            splitter,
            enricher: None,
            state: Mutex::new(IndexState { last_update }),
        }
    }

    /// Attach an enricher; documents will be LLM-summarized before indexing.
    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Project root this index covers.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Direct access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reload the index from the filesystem.
    ///
    /// Returns `true` iff any document was added. Per-file problems are
    /// logged and skipped; only a failing vector store backend (or the
    /// status cache write) surfaces as an error.
    pub async fn reload(&self, scope: Option<&Path>) -> Result<bool, KnowledgeError> {
        let mut state = self.state.lock().await;

        let known: HashSet<String> = self.store.list_sources().await?.into_iter().collect();
        // An empty index forces a full rebuild regardless of the timestamp.
        let since = if known.is_empty() { None } else { state.last_update };

        let loader = SourceLoader::new(&self.root, self.config.ignore_patterns.clone());
        let files = loader.list(scope, since, &known);

        let mut documents = Vec::new();
        for file in &files {
            documents.extend(self.splitter.split_file(file));
        }
        debug!(files = files.len(), documents = documents.len(), "reload scan");

        let added = !documents.is_empty();
        if added {
            // Whole-file replace: drop the stale chunks of every source we
            // are about to re-add, then insert the new set.
            let sources = distinct_sources(&documents);
            self.store.delete_by_sources(&sources).await?;

            let index_date = Utc::now();
            let documents = match &self.enricher {
                Some(enricher) => enricher.enrich_all(documents, index_date).await,
                None => enrich::stamp_index_date(documents, index_date),
            };
            self.store.add_documents(documents).await?;
        }

        let pruned = self.prune_deleted(&known).await?;

        if added || pruned {
            self.write_status_cache().await?;
        }
        state.last_update = Some(Utc::now());

        Ok(added)
    }

    /// Remove documents whose backing file no longer exists on disk.
    ///
    /// Returns `true` iff any deletion occurred.
    pub async fn detect_changes(&self) -> Result<bool, KnowledgeError> {
        let known: HashSet<String> = self.store.list_sources().await?.into_iter().collect();
        let pruned = self.prune_deleted(&known).await?;
        if pruned {
            self.write_status_cache().await?;
        }
        Ok(pruned)
    }

    /// Ranked query using the configured search type and result count.
    pub async fn search(&self, query: &str) -> Result<Vec<Document>, KnowledgeError> {
        self.store
            .search(query, self.config.result_count, self.config.search_type)
            .await
    }

    /// Status snapshot: last update, files pending indexing, store counts.
    pub async fn status(&self) -> Result<KnowledgeStatus, KnowledgeError> {
        let state = self.state.lock().await;
        let known: HashSet<String> = self.store.list_sources().await?.into_iter().collect();
        let since = if known.is_empty() { None } else { state.last_update };

        let loader = SourceLoader::new(&self.root, self.config.ignore_patterns.clone());
        let pending_files = loader.list(None, since, &known);
        let index = self.store.status().await?;

        Ok(KnowledgeStatus {
            last_update: state.last_update,
            pending_files,
            index,
        })
    }

    /// Forget local state so the next reload performs a full rebuild.
    ///
    /// The store's contents are owned by the backend; clearing them is the
    /// caller's decision, not ours.
    pub async fn reset(&self) -> Result<(), KnowledgeError> {
        let mut state = self.state.lock().await;
        state.last_update = None;

        let path = self.status_cache_path();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| KnowledgeError::io(&path, e))?;
        }
        Ok(())
    }

    fn status_cache_path(&self) -> PathBuf {
        status_cache_path(&self.root, &self.config)
    }

    async fn prune_deleted(&self, known: &HashSet<String>) -> Result<bool, KnowledgeError> {
        let missing: Vec<String> = known
            .iter()
            .filter(|source| !Path::new(source.as_str()).is_file())
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(false);
        }

        debug!(count = missing.len(), "pruning deleted sources");
        self.store.delete_by_sources(&missing).await?;
        Ok(true)
    }

    /// Full rewrite of the status cache: one `"<source> <language>"` line
    /// per indexed source.
    async fn write_status_cache(&self) -> Result<(), KnowledgeError> {
        let sources = self.store.list_sources().await?;
        let lines: Vec<String> = sources
            .iter()
            .map(|source| {
                let language =
                    splitter::languages::language_for_path(Path::new(source)).unwrap_or("txt");
                format!("{source} {language}")
            })
            .collect();

        let path = self.status_cache_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| KnowledgeError::io(parent, e))?;
        }
        fs::write(&path, lines.join("\n")).map_err(|e| KnowledgeError::io(&path, e))
    }
}

fn status_cache_path(root: &Path, config: &KnowledgeConfig) -> PathBuf {
    root.join(&config.data_dir).join(STATUS_CACHE_FILE)
}

fn status_cache_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    let mtime = metadata.modified().ok()?;
    Some(mtime.into())
}
