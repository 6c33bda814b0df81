use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{errors::DomainError, DocumentChunk};

/// Opaque retrieval+generation handle bound to one indexed document set.
/// Immutable once built; a reindex produces a new handle instead of mutating
/// this one.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, prompt: &str) -> Result<String, DomainError>;
}

/// The narrow seam to the embedding+index+LLM stack: `index` consumes chunks
/// and returns a ready engine. Embedding is an internal detail of `index`.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    async fn index(&self, chunks: Vec<DocumentChunk>) -> Result<Arc<dyn QueryEngine>, DomainError>;
}
