//! Mention lifecycle: extract, mark in progress, respond, replace.

use codx_core::mention::{
    extract_mentions, notify_mentions_error, notify_mentions_in_progress, replace_mentions,
};

#[test]
fn test_full_mention_lifecycle() {
    let content = concat!(
        "fn main() {\n",
        "    // @codx: add error handling here\n",
        "    run();\n",
        "}\n",
        "<codx --no-knowledge>\n",
        "Explain what run() does.\n",
        "</codx>\n",
    );

    // 1. Extract the work items.
    let mut mentions = extract_mentions(content);
    assert_eq!(mentions.len(), 2);
    assert_eq!(mentions[0].text, "add error handling here");
    assert!(mentions[1].has_flag("--no-knowledge"));

    // 2. Mark the file while the work is in flight.
    let marked = notify_mentions_in_progress(content);
    assert!(marked.contains("@codx-processing:"));
    assert!(marked.contains("<codx-processing"));
    assert!(marked.contains("</codx-processing>"));

    // 3. Splice the responses back over the original spans.
    mentions[0].response = Some("    run().expect(\"run failed\");".to_string());
    mentions[1].response = Some("// run() drives the main loop".to_string());

    let replaced = replace_mentions(content, &mentions);
    assert_eq!(
        replaced,
        concat!(
            "fn main() {\n",
            "    run().expect(\"run failed\");\n",
            "    run();\n",
            "}\n",
            "// run() drives the main loop\n",
            "",
        )
    );
}

#[test]
fn test_failed_mention_becomes_error_annotation() {
    let content = "@codx: refactor this\n";

    let in_progress = notify_mentions_in_progress(content);
    let errored = notify_mentions_error(&in_progress, "model unavailable");

    // The failure is captured in the content rather than raised.
    assert!(errored.contains("@codx-error: model unavailable:"));
    assert!(!errored.contains("codx-processing"));
}

#[test]
fn test_single_line_mention_shape() {
    let mentions = extract_mentions("pre\n@codx: do X\npost");
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].text, "do X");
    assert_eq!(mentions[0].start_line, 1);
    assert_eq!(mentions[0].end_line, None);
}
