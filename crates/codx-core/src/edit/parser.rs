//! Edit extraction from LLM response text.
//!
//! A line-oriented finite-state machine over three named states. The
//! subtlety is nested fences: a before/after payload may itself contain
//! fenced sub-blocks, so a ``` line seen while a HEAD..updated span is open
//! must be buffered as content rather than closing the block.

use tracing::warn;

use super::Edit;

const HEAD: &str = "<<<<<<< HEAD";
const DIVIDER: &str = "=======";
const UPDATED: &str = ">>>>>>> updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Outside any fence.
    Outside,
    /// Inside a fenced block, outside a HEAD..updated span.
    InFence,
    /// Inside a HEAD..updated span; fence lines are ordinary content here.
    InPatch,
}

/// Extract ordered edits from LLM response text.
///
/// Fenced blocks that do not contain the HEAD sentinel are not edits and
/// are discarded silently.
pub fn parse_edits(text: &str) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut state = ParseState::Outside;
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        match state {
            ParseState::Outside => {
                if line.trim_start().starts_with("```") {
                    state = ParseState::InFence;
                    block.clear();
                }
            }
            ParseState::InFence => {
                if line.starts_with("<<<<<<<") {
                    state = ParseState::InPatch;
                    block.push(line);
                } else if line.trim_start().starts_with("```") {
                    if let Some(edit) = edit_from_block(&block) {
                        edits.push(edit);
                    }
                    state = ParseState::Outside;
                    block.clear();
                } else {
                    block.push(line);
                }
            }
            ParseState::InPatch => {
                if line.starts_with(">>>>>>>") {
                    state = ParseState::InFence;
                }
                block.push(line);
            }
        }
    }

    // An unterminated fence at end of input is not a block.
    edits
}

/// Split a buffered block into an edit, or `None` when the block is not an
/// edit (no HEAD sentinel) or is malformed.
fn edit_from_block(lines: &[&str]) -> Option<Edit> {
    let head = lines.iter().position(|l| l.starts_with(HEAD))?;

    let raw_block = lines.join("\n");

    let updated = match lines.iter().rposition(|l| l.starts_with(UPDATED)) {
        Some(ix) if ix > head => ix,
        _ => {
            warn!("edit block has no closing sentinel; discarding");
            return None;
        }
    };
    let divider = match lines[head..updated].iter().position(|l| l.trim_end() == DIVIDER) {
        Some(ix) => head + ix,
        None => {
            warn!("edit block has no divider; discarding");
            return None;
        }
    };

    // First non-sentinel line names the file.
    let filename = lines[..head].iter().map(|l| l.trim()).find(|l| !l.is_empty())?;

    let before = lines[head + 1..divider].join("\n").trim().to_string();
    let after = lines[divider + 1..updated].join("\n").trim().to_string();

    Some(Edit {
        filename: filename.to_string(),
        before,
        after,
        raw_block,
    })
}
