//! Optional LLM enrichment of documents before indexing.
//!
//! Each document gets a one-shot summary folded into its indexed content so
//! the embedding carries intent as well as code. Enrichment is best-effort:
//! a failed summary keeps the raw content.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::debug;

use super::document::Document;
use crate::config::DEFAULT_ENRICH_CONCURRENCY;
use crate::llm::Llm;

const DEFAULT_ENRICH_PROMPT: &str = "Summarize in two sentences what the \
following {{ language }} code does, for a search index:\n\n{{ page_content }}";

/// Enriches documents with LLM summaries, one bounded task per document.
pub struct Enricher {
    llm: Arc<dyn Llm>,
    prompt_template: Option<String>,
    concurrency: usize,
}

impl Enricher {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            prompt_template: None,
            concurrency: DEFAULT_ENRICH_CONCURRENCY,
        }
    }

    /// Use a custom prompt template. `{{ page_content }}` and
    /// `{{ language }}` are substituted.
    pub fn with_prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enrich all documents concurrently. Completion order is not
    /// significant and a failure on one document never aborts the others;
    /// the collector loop is the only place results are aggregated.
    pub async fn enrich_all(
        &self,
        documents: Vec<Document>,
        index_date: DateTime<Utc>,
    ) -> Vec<Document> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = FuturesUnordered::new();

        for doc in documents {
            let llm = Arc::clone(&self.llm);
            let semaphore = Arc::clone(&semaphore);
            let prompt = self.build_prompt(&doc);

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let summary = match llm.complete(&prompt).await {
                    Ok(response) => response.trim().to_string(),
                    Err(e) => {
                        debug!(source = %doc.source, error = %e, "enrichment failed");
                        String::new()
                    }
                };
                enriched(doc, &summary, index_date)
            }));
        }

        let mut enriched_docs = Vec::new();
        while let Some(result) = tasks.next().await {
            match result {
                Ok(doc) => enriched_docs.push(doc),
                Err(e) => debug!(error = %e, "enrichment worker died"),
            }
        }
        enriched_docs
    }

    fn build_prompt(&self, doc: &Document) -> String {
        self.prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_ENRICH_PROMPT)
            .replace("{{ page_content }}", &doc.content)
            .replace("{{ language }}", &doc.language)
    }
}

/// Fold a summary into the document's indexed content and stamp the index
/// date. An empty summary leaves the content untouched.
fn enriched(mut doc: Document, summary: &str, index_date: DateTime<Utc>) -> Document {
    if !summary.is_empty() {
        doc.content = format!(
            "File path: {}\nSummary: {}\nCode:\n```{}\n{}\n```",
            doc.source, summary, doc.language, doc.content
        );
    }
    doc.metadata.index_date = Some(index_date);
    doc
}

/// Stamp the index date without enrichment.
pub fn stamp_index_date(documents: Vec<Document>, index_date: DateTime<Utc>) -> Vec<Document> {
    documents
        .into_iter()
        .map(|mut doc| {
            doc.metadata.index_date = Some(index_date);
            doc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;

    struct FixedLlm(&'static str);

    #[async_trait]
    impl Llm for FixedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, LlmError> {
            self.complete(prompt).await
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl Llm for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::RateLimited)
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, LlmError> {
            self.complete(prompt).await
        }
    }

    #[tokio::test]
    async fn test_enrichment_folds_summary_into_content() {
        let enricher = Enricher::new(Arc::new(FixedLlm("does things")));
        let docs = vec![Document::new("/p/a.rs", "rust", "fn a() {}", 0)];

        let out = enricher.enrich_all(docs, Utc::now()).await;
        assert_eq!(out.len(), 1);
        assert!(out[0].content.contains("Summary: does things"));
        assert!(out[0].content.contains("fn a() {}"));
        assert!(out[0].metadata.index_date.is_some());
    }

    #[tokio::test]
    async fn test_failed_enrichment_keeps_raw_content() {
        let enricher = Enricher::new(Arc::new(FailingLlm));
        let docs = vec![Document::new("/p/a.rs", "rust", "fn a() {}", 0)];

        let out = enricher.enrich_all(docs, Utc::now()).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "fn a() {}");
        assert!(out[0].metadata.index_date.is_some());
    }

    #[tokio::test]
    async fn test_all_documents_survive_concurrent_enrichment() {
        let enricher = Enricher::new(Arc::new(FixedLlm("s"))).with_concurrency(2);
        let docs: Vec<Document> = (0..20)
            .map(|ix| Document::new(format!("/p/{ix}.rs"), "rust", "fn x() {}", 0))
            .collect();

        let out = enricher.enrich_all(docs, Utc::now()).await;
        assert_eq!(out.len(), 20);
    }
}
