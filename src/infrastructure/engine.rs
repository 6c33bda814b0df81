use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{
    ports::{EmbeddingService, LlmService, QueryEngine, RetrievalBackend, VectorStore},
    DocumentChunk, DomainError,
};
use crate::infrastructure::vector_store::InMemoryVectorStore;

/// Concrete retrieval backend: embeds chunks into a fresh in-memory vector
/// store and wires it to the LLM behind a [`QueryEngine`] handle.
pub struct RagBackend {
    embedding: Arc<dyn EmbeddingService>,
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    top_k: usize,
}

impl RagBackend {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        llm: Arc<dyn LlmService>,
        system_prompt: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            embedding,
            llm,
            system_prompt: system_prompt.into(),
            top_k,
        }
    }
}

#[async_trait]
impl RetrievalBackend for RagBackend {
    async fn index(&self, chunks: Vec<DocumentChunk>) -> Result<Arc<dyn QueryEngine>, DomainError> {
        let store = InMemoryVectorStore::new();

        if !chunks.is_empty() {
            let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
            let embeddings = self.embedding.embed_batch(&texts).await?;

            for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
                store.upsert(chunk, embedding).await?;
            }
        }

        Ok(Arc::new(RagQueryEngine {
            store: Arc::new(store),
            embedding: self.embedding.clone(),
            llm: self.llm.clone(),
            system_prompt: self.system_prompt.clone(),
            top_k: self.top_k,
        }))
    }
}

struct RagQueryEngine {
    store: Arc<dyn VectorStore>,
    embedding: Arc<dyn EmbeddingService>,
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    top_k: usize,
}

#[async_trait]
impl QueryEngine for RagQueryEngine {
    async fn query(&self, prompt: &str) -> Result<String, DomainError> {
        let query_embedding = self.embedding.embed(prompt).await?;
        let results = self.store.search(&query_embedding, self.top_k).await?;
        debug!(retrieved = results.len(), "context retrieved");

        let context = results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let full_prompt = if context.is_empty() {
            prompt.to_string()
        } else {
            format!("Context:\n{context}\n\n{prompt}")
        };

        self.llm
            .complete_with_system(&self.system_prompt, &full_prompt)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Embedding;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Deterministic two-axis embedding: texts containing "cats" map to one
    /// axis, everything else to the other.
    struct KeywordEmbedding;

    #[async_trait]
    impl EmbeddingService for KeywordEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            if text.contains("cats") {
                Ok(Embedding::new(vec![1.0, 0.0]))
            } else {
                Ok(Embedding::new(vec![0.0, 1.0]))
            }
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct RecordingLlm {
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LlmService for RecordingLlm {
        async fn complete_with_system(
            &self,
            system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok("answer".to_string())
        }
    }

    fn backend() -> (RagBackend, Arc<RecordingLlm>) {
        let llm = Arc::new(RecordingLlm {
            prompts: Mutex::new(Vec::new()),
        });
        (
            RagBackend::new(Arc::new(KeywordEmbedding), llm.clone(), "system", 1),
            llm,
        )
    }

    #[tokio::test]
    async fn test_query_includes_retrieved_context() {
        let (backend, llm) = backend();
        let doc_id = Uuid::new_v4();
        let chunks = vec![
            DocumentChunk::new(doc_id, "all about cats", 0),
            DocumentChunk::new(doc_id, "all about dogs", 1),
        ];

        let engine = backend.index(chunks).await.unwrap();
        engine.query("tell me about cats").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        let (system, prompt) = &prompts[0];
        assert_eq!(system, "system");
        assert!(prompt.starts_with("Context:\nall about cats"));
        assert!(prompt.ends_with("tell me about cats"));
    }

    #[tokio::test]
    async fn test_empty_engine_queries_without_context() {
        let (backend, llm) = backend();

        let engine = backend.index(Vec::new()).await.unwrap();
        let answer = engine.query("hello").await.unwrap();

        assert_eq!(answer, "answer");
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts[0].1, "hello");
    }
}
