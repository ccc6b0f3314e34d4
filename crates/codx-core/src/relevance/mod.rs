//! Concurrent relevance filtering of candidate documents.
//!
//! Each candidate is scored against the query by the LLM from its own
//! bounded worker task; results flow back over a channel to a single
//! collector loop, so the aggregation point stays single-threaded. A worker
//! that fails to produce a usable score retries once, then degrades to an
//! excluded score instead of propagating an error.

mod prompts;

pub use prompts::{build_relevance_prompt, RELEVANCE_SYSTEM_PROMPT};

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::config::DEFAULT_SCORING_CONCURRENCY;
use crate::knowledge::Document;
use crate::llm::Llm;

/// Score assigned when scoring fails twice; below any positive cutoff.
pub const EXCLUDED_SCORE: f32 = -1.0;

/// Filters candidate documents by LLM-judged relevance to a query.
pub struct RelevanceValidator {
    llm: Arc<dyn Llm>,
    concurrency: usize,
}

impl RelevanceValidator {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            concurrency: DEFAULT_SCORING_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Return the candidates whose relevance score reaches `cutoff`.
    ///
    /// A cutoff <= 0 disables scoring and returns the candidates unchanged.
    /// Collection order follows completion order; callers must not rely on
    /// input ordering.
    pub async fn filter(
        &self,
        query: &str,
        candidates: Vec<Document>,
        cutoff: f32,
    ) -> Vec<Document> {
        if cutoff <= 0.0 {
            return candidates;
        }

        let (tx, mut rx) = mpsc::channel(candidates.len().max(1));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        for mut doc in candidates {
            let tx = tx.clone();
            let llm = Arc::clone(&self.llm);
            let semaphore = Arc::clone(&semaphore);
            let query = query.to_string();

            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let score = score_document(llm.as_ref(), &query, &doc.content).await;
                doc.metadata.relevance_score = Some(score);
                debug!(source = %doc.source, score, "scored candidate");
                // The collector may already be gone if the caller dropped
                // the future; nothing to do about it here.
                let _ = tx.send(doc).await;
            });
        }
        drop(tx);

        let mut kept = Vec::new();
        while let Some(doc) = rx.recv().await {
            if doc.metadata.relevance_score.unwrap_or(EXCLUDED_SCORE) >= cutoff {
                kept.push(doc);
            }
        }
        kept
    }
}

/// Score one document, retrying once on an unusable response.
async fn score_document(llm: &dyn Llm, query: &str, content: &str) -> f32 {
    let prompt = build_relevance_prompt(query, content);

    for attempt in 0..2 {
        match llm
            .complete_with_system(RELEVANCE_SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(response) => {
                if let Some(score) = parse_score(&response) {
                    return score;
                }
                warn!(attempt, response = %response.trim(), "unparseable relevance response");
            }
            Err(e) => {
                warn!(attempt, error = %e, "relevance scoring failed");
            }
        }
    }

    EXCLUDED_SCORE
}

/// Parse the trailing percentage token of a scoring response.
///
/// Accepts `NN%` (normalized by 100) anywhere, preferring the last
/// occurrence; as a fallback, a bare trailing number is taken as 0..=1 when
/// it is <= 1 and as a percentage when <= 100. Anything else is unusable.
pub fn parse_score(response: &str) -> Option<f32> {
    static PERCENT: OnceLock<Regex> = OnceLock::new();
    let percent = PERCENT.get_or_init(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*%").unwrap());

    if let Some(captures) = percent.captures_iter(response).last() {
        let value: f32 = captures[1].parse().ok()?;
        if value <= 100.0 {
            return Some(value / 100.0);
        }
        return None;
    }

    let last_token = response.split_whitespace().last()?;
    let value: f32 = last_token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.').parse().ok()?;
    if value <= 1.0 {
        Some(value)
    } else if value <= 100.0 {
        Some(value / 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_score("RELEVANCE: 85%"), Some(0.85));
        assert_eq!(parse_score("RELEVANCE: 100%"), Some(1.0));
        assert_eq!(parse_score("RELEVANCE: 0%"), Some(0.0));
    }

    #[test]
    fn test_parse_takes_last_percentage() {
        assert_eq!(parse_score("from 0% to 100%: RELEVANCE: 40%"), Some(0.4));
    }

    #[test]
    fn test_parse_bare_decimal() {
        assert_eq!(parse_score("score 0.75"), Some(0.75));
        assert_eq!(parse_score("85"), Some(0.85));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_score("no idea"), None);
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("RELEVANCE: 250%"), None);
    }
}
