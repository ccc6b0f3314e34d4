//! Source file enumeration.
//!
//! Candidate sources are the version-control-tracked and
//! untracked-but-not-ignored files under the project root; outside a
//! repository this degrades to a plain filesystem walk. The staleness test
//! decides which of them need (re)indexing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use tracing::{debug, warn};

/// Enumerates indexable source files under a project root.
pub struct SourceLoader {
    root: PathBuf,
    ignore_patterns: Vec<String>,
}

impl SourceLoader {
    pub fn new(root: impl Into<PathBuf>, ignore_patterns: Vec<String>) -> Self {
        Self {
            root: root.into(),
            ignore_patterns,
        }
    }

    /// List files that need indexing.
    ///
    /// A path is included iff it is a regular, non-empty file, matches no
    /// ignore substring, falls under `scope` (when given), and passes the
    /// staleness test: `since` unset (full rebuild), mtime newer than
    /// `since`, or absent from `known_sources`. Failures on individual
    /// paths are logged and skipped, never fatal.
    pub fn list(
        &self,
        scope: Option<&Path>,
        since: Option<DateTime<Utc>>,
        known_sources: &HashSet<String>,
    ) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(scope) = scope {
                if !path.starts_with(scope) {
                    continue;
                }
            }

            let path_str = path.to_string_lossy();
            if self.ignore_patterns.iter().any(|p| path_str.contains(p.as_str())) {
                continue;
            }

            match self.needs_index(path, since, known_sources) {
                Ok(true) => files.push(path.to_path_buf()),
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                }
            }
        }

        debug!(count = files.len(), root = %self.root.display(), "listed sources");
        files
    }

    /// The staleness test: empty files never index; otherwise index when
    /// doing a full rebuild, when modified since the last update, or when
    /// the file is not yet part of the known source set.
    fn needs_index(
        &self,
        path: &Path,
        since: Option<DateTime<Utc>>,
        known_sources: &HashSet<String>,
    ) -> std::io::Result<bool> {
        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Ok(false);
        }

        let Some(since) = since else {
            return Ok(true); // full rebuild
        };

        let mtime: DateTime<Utc> = metadata.modified()?.into();
        if mtime > since {
            return Ok(true);
        }

        Ok(!known_sources.contains(path.to_string_lossy().as_ref()))
    }
}
