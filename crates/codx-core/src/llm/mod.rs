//! LLM provider abstraction.
//!
//! The indexing core consumes completions for two things only: relevance
//! scoring and document enrichment. Both are short, non-streaming requests,
//! so the trait surface stays deliberately small.

mod claude;
mod error;
mod openai;
mod provider;

pub use claude::ClaudeClient;
pub use error::LlmError;
pub use openai::OpenAiClient;
pub use provider::Provider;

use async_trait::async_trait;

/// Trait for Large Language Model providers.
///
/// Allows swapping providers without changing the indexing or scoring code.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Complete a prompt and return the response text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Complete a prompt with a system message.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl Llm for Box<dyn Llm> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        (**self).complete_with_system(system, prompt).await
    }
}
