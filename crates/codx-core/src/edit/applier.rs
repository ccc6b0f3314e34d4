//! Edit application against a workspace.
//!
//! Writes are constrained to paths under the workspace root. Failures are
//! per-edit: a bad edit is reported while its siblings still apply. There
//! is no rollback; whatever was written stays written.

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use super::Edit;

/// Per-edit hard failures.
#[derive(Debug, Error)]
pub enum EditError {
    /// The edit wants to create a file that is already present.
    #[error("the edit wants to create `{0}`, but that file already exists")]
    AlreadyExists(String),

    /// The target resolves outside the workspace root.
    #[error("edit target `{0}` escapes the workspace")]
    OutsideWorkspace(String),

    /// The target of a replacement edit does not exist.
    #[error("no such file in workspace: `{0}`")]
    MissingFile(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one applied edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Whether the edit counts as applied. Deliberately permissive: a
    /// replacement whose `before` text was not found still reports true,
    /// with a note asking for manual intervention.
    pub applied: bool,
    /// Warning attached to the outcome, if any.
    pub note: Option<String>,
}

impl ApplyReport {
    fn clean() -> Self {
        Self { applied: true, note: None }
    }

    fn with_note(note: impl Into<String>) -> Self {
        Self { applied: true, note: Some(note.into()) }
    }
}

/// Apply a single edit to the workspace.
pub fn apply_edit(edit: &Edit, workspace: &Path) -> Result<ApplyReport, EditError> {
    let target = resolve_target(workspace, &edit.filename)?;

    if edit.before.is_empty() {
        // Create-new-file semantics.
        if target.exists() {
            return Err(EditError::AlreadyExists(edit.filename.clone()));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| EditError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&target, &edit.after).map_err(|e| EditError::Io {
            path: target.clone(),
            source: e,
        })?;
        return Ok(ApplyReport::clean());
    }

    if !target.is_file() {
        return Err(EditError::MissingFile(edit.filename.clone()));
    }

    let content = fs::read_to_string(&target).map_err(|e| EditError::Io {
        path: target.clone(),
        source: e,
    })?;

    let occurrences = content.matches(edit.before.as_str()).count();
    let replaced = content.replace(edit.before.as_str(), &edit.after);

    if replaced == content {
        // Nothing matched. Not a hard failure: the caller is told to apply
        // the change by hand instead.
        return Ok(ApplyReport::with_note(format!(
            "change not applied to `{}`: the text to replace was not found; \
             manual intervention needed\n{}",
            edit.filename, edit.raw_block
        )));
    }

    fs::write(&target, &replaced).map_err(|e| EditError::Io {
        path: target.clone(),
        source: e,
    })?;

    if occurrences > 1 {
        warn!(file = %edit.filename, occurrences, "replaced multiple occurrences");
        return Ok(ApplyReport::with_note(format!(
            "the text to replace was found {} times in `{}`; all occurrences \
             were replaced",
            occurrences, edit.filename
        )));
    }

    Ok(ApplyReport::clean())
}

/// Result of applying a batch of edits.
#[derive(Debug, Default)]
pub struct ApplySummary {
    /// Number of edits that reported applied.
    pub applied: usize,
    /// Soft warnings from applied edits.
    pub notes: Vec<String>,
    /// Hard per-edit errors; the corresponding edits did not apply.
    pub errors: Vec<String>,
}

/// Apply all edits in order. A failing edit is recorded and its siblings
/// still apply.
pub fn apply_edits(edits: &[Edit], workspace: &Path) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for edit in edits {
        match apply_edit(edit, workspace) {
            Ok(report) => {
                if report.applied {
                    summary.applied += 1;
                }
                if let Some(note) = report.note {
                    summary.notes.push(note);
                }
            }
            Err(e) => summary.errors.push(format!("{}: {e}", edit.filename)),
        }
    }

    summary
}

/// Resolve an edit target under the workspace root, rejecting absolute
/// paths and any traversal that would escape it.
fn resolve_target(workspace: &Path, filename: &str) -> Result<PathBuf, EditError> {
    let relative = Path::new(filename);
    if relative.is_absolute() {
        return Err(EditError::OutsideWorkspace(filename.to_string()));
    }

    let mut depth: i32 = 0;
    let mut resolved = workspace.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                depth += 1;
                resolved.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(EditError::OutsideWorkspace(filename.to_string()));
                }
                resolved.pop();
            }
            _ => return Err(EditError::OutsideWorkspace(filename.to_string())),
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn edit(filename: &str, before: &str, after: &str) -> Edit {
        Edit {
            filename: filename.to_string(),
            before: before.to_string(),
            after: after.to_string(),
            raw_block: String::new(),
        }
    }

    #[test]
    fn test_replace_first_occurrence() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f.py"), "x=1\ny=2").unwrap();

        let report = apply_edit(&edit("f.py", "x=1", "x=2"), tmp.path()).unwrap();

        assert!(report.applied);
        assert!(report.note.is_none());
        assert_eq!(fs::read_to_string(tmp.path().join("f.py")).unwrap(), "x=2\ny=2");
    }

    #[test]
    fn test_new_file_created() {
        let tmp = TempDir::new().unwrap();

        let report = apply_edit(&edit("sub/new.py", "", "print('hi')"), tmp.path()).unwrap();

        assert!(report.applied);
        assert_eq!(
            fs::read_to_string(tmp.path().join("sub/new.py")).unwrap(),
            "print('hi')"
        );
    }

    #[test]
    fn test_new_file_conflict_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f.py"), "original").unwrap();

        let err = apply_edit(&edit("f.py", "", "new"), tmp.path()).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        // File unchanged.
        assert_eq!(fs::read_to_string(tmp.path().join("f.py")).unwrap(), "original");
    }

    #[test]
    fn test_not_found_is_soft_note() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f.py"), "x=1").unwrap();

        let report = apply_edit(&edit("f.py", "nope", "never"), tmp.path()).unwrap();

        assert!(report.applied);
        assert!(report.note.unwrap().contains("manual intervention"));
        assert_eq!(fs::read_to_string(tmp.path().join("f.py")).unwrap(), "x=1");
    }

    #[test]
    fn test_multiple_occurrences_all_replaced_with_note() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f.py"), "a\nb\na\n").unwrap();

        let report = apply_edit(&edit("f.py", "a", "c"), tmp.path()).unwrap();

        assert!(report.applied);
        assert!(report.note.unwrap().contains("all occurrences"));
        assert_eq!(fs::read_to_string(tmp.path().join("f.py")).unwrap(), "c\nb\nc\n");
    }

    #[test]
    fn test_traversal_is_rejected() {
        let tmp = TempDir::new().unwrap();

        let err = apply_edit(&edit("../escape.txt", "", "x"), tmp.path()).unwrap_err();
        assert!(matches!(err, EditError::OutsideWorkspace(_)));

        let err = apply_edit(&edit("a/../../escape.txt", "", "x"), tmp.path()).unwrap_err();
        assert!(matches!(err, EditError::OutsideWorkspace(_)));

        // Descend-then-climb within the workspace is fine.
        assert!(apply_edit(&edit("a/../ok.txt", "", "x"), tmp.path()).is_ok());
    }

    #[test]
    fn test_absolute_target_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let err = apply_edit(&edit("/etc/passwd", "", "x"), tmp.path()).unwrap_err();
        assert!(matches!(err, EditError::OutsideWorkspace(_)));
    }

    #[test]
    fn test_batch_applies_siblings_past_failures() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("exists.py"), "keep").unwrap();
        fs::write(tmp.path().join("edit.py"), "x=1").unwrap();

        let edits = vec![
            edit("exists.py", "", "conflict"), // hard error
            edit("edit.py", "x=1", "x=2"),     // applies
        ];
        let summary = apply_edits(&edits, tmp.path());

        assert_eq!(summary.applied, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("already exists"));
        assert_eq!(fs::read_to_string(tmp.path().join("edit.py")).unwrap(), "x=2");
    }
}
