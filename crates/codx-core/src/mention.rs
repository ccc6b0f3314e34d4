//! Inline mention directives embedded in file content.
//!
//! A mention asks the assistant to work on a specific line or region of a
//! file. Two shapes exist: the line-scoped `@codx:` sentinel, which captures
//! the remainder of its line, and the span-scoped `<codx ...>` / `</codx>`
//! pair, which captures the interior lines. Flags ride on the opening tag
//! (`--no-knowledge`, `--model=x`). While a mention is being worked on its
//! sentinels are rewritten to `-processing` variants, and on failure to
//! `-error: <message>`.

use serde::{Deserialize, Serialize};

/// Line-scoped mention sentinel.
pub const SINGLE_LINE_MENTION_START: &str = "@codx:";
/// Span-scoped mention opening tag prefix.
pub const MULTI_LINE_MENTION_START: &str = "<codx";
/// Span-scoped mention closing tag.
pub const MULTI_LINE_MENTION_END: &str = "</codx>";

const SINGLE_LINE_MENTION_PROGRESS: &str = "@codx-processing:";
const MULTI_LINE_MENTION_START_PROGRESS: &str = "<codx-processing";
const MULTI_LINE_MENTION_END_PROGRESS: &str = "</codx-processing>";

/// An inline directive extracted from file content.
///
/// `start_line` and `end_line` are 0-based line indices of the sentinel
/// lines; `end_line` is `None` for single-line mentions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mention {
    /// The directive text, sentinels and flags stripped.
    pub text: String,
    pub start_line: usize,
    pub end_line: Option<usize>,
    /// Response produced for this mention, reinserted by
    /// [`replace_mentions`].
    pub response: Option<String>,
    /// Flags from the opening tag, e.g. `--no-knowledge`, `--model=x`.
    pub flags: Vec<String>,
}

impl Mention {
    /// Whether a flag like `--no-knowledge` is present.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name || f.starts_with(&format!("{name}=")))
    }

    /// Value of a `--name=value` flag.
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .find_map(|f| f.strip_prefix(&format!("{name}=")))
    }
}

#[derive(Debug)]
enum ScanState {
    /// Not inside any mention.
    None,
    /// On a line-scoped mention. Line-scoped means the state opens and
    /// drains within a single line; the loop steps it out immediately.
    Single(Mention),
    /// Inside an open span-scoped mention.
    Multi(Mention),
}

/// Extract mentions from content, in document order.
pub fn extract_mentions(content: &str) -> Vec<Mention> {
    let mut mentions = Vec::new();
    let mut state = ScanState::None;

    for (ix, line) in content.lines().enumerate() {
        state = advance(state, ix, line, &mut mentions);
        if matches!(state, ScanState::Single(_)) {
            state = advance(state, ix, line, &mut mentions);
        }
    }

    // An unterminated span mention is dropped with the scan.
    mentions
}

/// One FSM transition for one input line.
fn advance(state: ScanState, ix: usize, line: &str, mentions: &mut Vec<Mention>) -> ScanState {
    match state {
        ScanState::None => {
            if let Some(pos) = line.find(SINGLE_LINE_MENTION_START) {
                let text = line[pos + SINGLE_LINE_MENTION_START.len()..].trim();
                ScanState::Single(Mention {
                    text: text.to_string(),
                    start_line: ix,
                    ..Mention::default()
                })
            } else if let Some(pos) = line.find(MULTI_LINE_MENTION_START) {
                let tag = &line[pos + MULTI_LINE_MENTION_START.len()..];
                ScanState::Multi(Mention {
                    start_line: ix,
                    flags: parse_flags(tag),
                    ..Mention::default()
                })
            } else {
                ScanState::None
            }
        }
        ScanState::Single(mention) => {
            mentions.push(mention);
            ScanState::None
        }
        ScanState::Multi(mut mention) => {
            if line.contains(MULTI_LINE_MENTION_END) {
                mention.end_line = Some(ix);
                mention.text = mention.text.trim().to_string();
                mentions.push(mention);
                ScanState::None
            } else {
                if !mention.text.is_empty() {
                    mention.text.push('\n');
                }
                mention.text.push_str(line);
                ScanState::Multi(mention)
            }
        }
    }
}

/// Flags are the `--token` words of the opening tag.
fn parse_flags(tag_rest: &str) -> Vec<String> {
    tag_rest
        .trim_end_matches('>')
        .split_whitespace()
        .filter(|token| token.starts_with("--"))
        .map(|token| token.to_string())
        .collect()
}

/// Rewrite mention sentinels to their in-progress variants.
///
/// Pure textual substitution over fresh input; content without live
/// sentinels passes through unchanged.
pub fn notify_mentions_in_progress(content: &str) -> String {
    content
        .replace(SINGLE_LINE_MENTION_START, SINGLE_LINE_MENTION_PROGRESS)
        .replace(MULTI_LINE_MENTION_END, MULTI_LINE_MENTION_END_PROGRESS)
        .replace(MULTI_LINE_MENTION_START, MULTI_LINE_MENTION_START_PROGRESS)
}

/// Rewrite in-progress sentinels into error annotations.
pub fn notify_mentions_error(content: &str, error: &str) -> String {
    content.replace("codx-processing", &format!("codx-error: {error}"))
}

/// Reinsert each mention's response at its original span. Lines outside the
/// spans are preserved byte-for-byte.
pub fn replace_mentions(content: &str, mentions: &[Mention]) -> String {
    splice_mentions(content, mentions, true)
}

/// Remove mention spans from content entirely.
pub fn strip_mentions(content: &str, mentions: &[Mention]) -> String {
    splice_mentions(content, mentions, false)
}

fn splice_mentions(content: &str, mentions: &[Mention], with_response: bool) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut output: Vec<&str> = Vec::new();
    let mut cursor = 0usize;

    for mention in mentions {
        if mention.start_line >= lines.len() {
            continue;
        }
        output.extend(&lines[cursor..mention.start_line]);
        if with_response {
            if let Some(response) = &mention.response {
                output.extend(response.split('\n'));
            }
        }
        cursor = mention.end_line.unwrap_or(mention.start_line) + 1;
    }

    if cursor < lines.len() {
        output.extend(&lines[cursor..]);
    }
    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_mention() {
        let content = "pre\n@codx: do X\npost";
        let mentions = extract_mentions(content);

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "do X");
        assert_eq!(mentions[0].start_line, 1);
        assert_eq!(mentions[0].end_line, None);
    }

    #[test]
    fn test_multi_line_mention() {
        let content = "pre\n<codx>\nfirst\nsecond\n</codx>\npost";
        let mentions = extract_mentions(content);

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "first\nsecond");
        assert_eq!(mentions[0].start_line, 1);
        assert_eq!(mentions[0].end_line, Some(4));
    }

    #[test]
    fn test_mixed_mentions_in_order() {
        let content = "@codx: one\nmid\n<codx>\ntwo\n</codx>\n";
        let mentions = extract_mentions(content);

        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].text, "one");
        assert_eq!(mentions[1].text, "two");
        assert_eq!(mentions[1].start_line, 2);
        assert_eq!(mentions[1].end_line, Some(4));
    }

    #[test]
    fn test_flags_parsed_and_stripped() {
        let content = "<codx --no-knowledge --model=gpt-4>\nbody\n</codx>";
        let mentions = extract_mentions(content);

        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "body");
        assert!(mentions[0].has_flag("--no-knowledge"));
        assert_eq!(mentions[0].flag_value("--model"), Some("gpt-4"));
    }

    #[test]
    fn test_unterminated_multi_mention_is_dropped() {
        let content = "<codx>\ndangling";
        assert!(extract_mentions(content).is_empty());
    }

    #[test]
    fn test_notify_in_progress() {
        let content = "@codx: a\n<codx>\nb\n</codx>";
        let marked = notify_mentions_in_progress(content);

        assert!(marked.contains("@codx-processing: a"));
        assert!(marked.contains("<codx-processing>"));
        assert!(marked.contains("</codx-processing>"));
        // Content without sentinels passes through untouched.
        assert_eq!(notify_mentions_in_progress("plain text"), "plain text");
    }

    #[test]
    fn test_notify_error() {
        let marked = notify_mentions_in_progress("@codx: a");
        let errored = notify_mentions_error(&marked, "boom");
        assert!(errored.contains("@codx-error: boom:"));
    }

    #[test]
    fn test_replace_mentions_splices_responses() {
        let content = "keep0\n@codx: task\nkeep2\n<codx>\nbody\n</codx>\nkeep6";
        let mut mentions = extract_mentions(content);
        mentions[0].response = Some("answer one".to_string());
        mentions[1].response = Some("answer two\nline two".to_string());

        let replaced = replace_mentions(content, &mentions);
        assert_eq!(
            replaced,
            "keep0\nanswer one\nkeep2\nanswer two\nline two\nkeep6"
        );
    }

    #[test]
    fn test_strip_mentions_removes_spans() {
        let content = "keep0\n@codx: task\nkeep2\n<codx>\nbody\n</codx>\nkeep6";
        let mentions = extract_mentions(content);

        let stripped = strip_mentions(content, &mentions);
        assert_eq!(stripped, "keep0\nkeep2\nkeep6");
    }

    #[test]
    fn test_replace_preserves_untouched_lines_exactly() {
        let content = "  indented\t\n@codx: x\n\ttrailing  ";
        let mut mentions = extract_mentions(content);
        mentions[0].response = Some("r".to_string());

        let replaced = replace_mentions(content, &mentions);
        assert_eq!(replaced, "  indented\t\nr\n\ttrailing  ");
    }
}
