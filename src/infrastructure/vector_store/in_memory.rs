use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DocumentChunk, DomainError, Embedding, SearchResult};

/// Cosine-similarity store over an in-process vector. One instance backs one
/// query engine; it lives and dies with the engine that owns it.
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(c, _)| c.id != chunk.id);
        store.push((chunk.clone(), embedding.clone()));
        Ok(())
    }

    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(results.into_iter().take(top_k).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_upsert_and_search() {
        let store = InMemoryVectorStore::new();
        let doc_id = Uuid::new_v4();

        let chunk = DocumentChunk::new(doc_id, "test content", 0);
        let embedding = Embedding::new(vec![1.0, 0.0, 0.0]);

        store.upsert(&chunk, &embedding).await.unwrap();

        let query = Embedding::new(vec![1.0, 0.0, 0.0]);
        let results = store.search(&query, 1).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let store = InMemoryVectorStore::new();
        let doc_id = Uuid::new_v4();

        let near = DocumentChunk::new(doc_id, "near", 0);
        let far = DocumentChunk::new(doc_id, "far", 1);
        store
            .upsert(&near, &Embedding::new(vec![1.0, 0.1]))
            .await
            .unwrap();
        store
            .upsert(&far, &Embedding::new(vec![0.1, 1.0]))
            .await
            .unwrap();

        let results = store
            .search(&Embedding::new(vec![1.0, 0.0]), 2)
            .await
            .unwrap();

        assert_eq!(results[0].chunk.content, "near");
        assert_eq!(results[1].chunk.content, "far");
    }

    #[tokio::test]
    async fn test_search_empty_store() {
        let store = InMemoryVectorStore::new();
        let results = store
            .search(&Embedding::new(vec![1.0, 0.0]), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
