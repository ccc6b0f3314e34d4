//! Prompt construction for relevance scoring.

/// System prompt for relevance scoring requests.
pub const RELEVANCE_SYSTEM_PROMPT: &str = "You judge whether a document from \
a codebase is relevant to a user request. Reply with a single line ending in \
a percentage from 0% (unrelated) to 100% (directly relevant), in the form \
`RELEVANCE: NN%`. Output nothing else.";

/// Build the scoring prompt for one candidate document.
pub fn build_relevance_prompt(query: &str, document_content: &str) -> String {
    format!(
        "User request:\n{query}\n\nDocument:\n{document_content}\n\n\
         How relevant is the document to the request? Answer with \
         `RELEVANCE: NN%`."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_query_and_content() {
        let prompt = build_relevance_prompt("fix the login bug", "fn login() {}");
        assert!(prompt.contains("fix the login bug"));
        assert!(prompt.contains("fn login() {}"));
        assert!(prompt.contains("RELEVANCE"));
    }
}
