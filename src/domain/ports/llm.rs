use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// Generation side of the query engine. One blocking completion per chat
/// turn, carrying the Q&A system prompt; no retries, no streaming.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete_with_system(&self, system: &str, prompt: &str)
        -> Result<String, DomainError>;
}
