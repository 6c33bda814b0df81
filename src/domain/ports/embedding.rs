use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Embedding side of the query engine: document chunks go through
/// `embed_batch` at index time, the assembled prompt through `embed` at
/// query time. `dimension` is the vector width the index is built with.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
