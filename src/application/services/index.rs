use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::services::EngineRegistry;
use crate::domain::{
    chunk_content,
    ports::{DocumentStore, QueryEngine, RetrievalBackend},
    DomainError,
};

/// Rebuilds a session's query engine from the documents currently stored for
/// that session. The rebuild is wholesale: every document is re-chunked and
/// re-embedded, and the resulting engine replaces the previous handle.
pub struct IndexService {
    documents: Arc<dyn DocumentStore>,
    backend: Arc<dyn RetrievalBackend>,
    registry: Arc<EngineRegistry>,
    chunk_size: usize,
}

impl IndexService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        backend: Arc<dyn RetrievalBackend>,
        registry: Arc<EngineRegistry>,
        chunk_size: usize,
    ) -> Self {
        Self {
            documents,
            backend,
            registry,
            chunk_size,
        }
    }

    #[instrument(skip(self))]
    pub async fn rebuild(&self, session: Uuid) -> Result<Arc<dyn QueryEngine>, DomainError> {
        let docs = self.documents.load_all(session).await?;

        let mut chunks = Vec::new();
        for doc in &docs {
            chunks.extend(chunk_content(doc.id, &doc.content, self.chunk_size));
        }

        info!(
            %session,
            documents = docs.len(),
            chunks = chunks.len(),
            "rebuilding query engine"
        );

        let engine = self.backend.index(chunks).await?;
        self.registry.swap(session, engine.clone())?;
        Ok(engine)
    }

    /// Clears a session's uploaded documents and evicts its engine handle so
    /// no query can reach an index built from deleted files.
    #[instrument(skip(self))]
    pub async fn clear(&self, session: Uuid) -> Result<(), DomainError> {
        self.documents.clear(session).await?;
        self.registry.evict(session)
    }

    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<(), DomainError> {
        self.documents.clear_all().await?;
        self.registry.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, DocumentChunk, StoredFile};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubStore {
        docs: Vec<Document>,
        cleared: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl DocumentStore for StubStore {
        async fn save(
            &self,
            _session: Uuid,
            _original_name: &str,
            _bytes: &[u8],
        ) -> Result<StoredFile, DomainError> {
            unimplemented!("not used in these tests")
        }

        async fn load_all(&self, _session: Uuid) -> Result<Vec<Document>, DomainError> {
            Ok(self.docs.clone())
        }

        async fn clear(&self, session: Uuid) -> Result<(), DomainError> {
            self.cleared.lock().unwrap().push(session);
            Ok(())
        }

        async fn clear_all(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct StubEngine;

    #[async_trait]
    impl QueryEngine for StubEngine {
        async fn query(&self, _prompt: &str) -> Result<String, DomainError> {
            Ok("ok".into())
        }
    }

    struct StubBackend {
        indexed: Mutex<Vec<Vec<DocumentChunk>>>,
    }

    #[async_trait]
    impl RetrievalBackend for StubBackend {
        async fn index(
            &self,
            chunks: Vec<DocumentChunk>,
        ) -> Result<Arc<dyn QueryEngine>, DomainError> {
            self.indexed.lock().unwrap().push(chunks);
            Ok(Arc::new(StubEngine))
        }
    }

    fn service(docs: Vec<Document>) -> (IndexService, Arc<StubBackend>, Arc<EngineRegistry>) {
        let backend = Arc::new(StubBackend {
            indexed: Mutex::new(Vec::new()),
        });
        let registry = Arc::new(EngineRegistry::new());
        let store = Arc::new(StubStore {
            docs,
            cleared: Mutex::new(Vec::new()),
        });
        let svc = IndexService::new(store, backend.clone(), registry.clone(), 1000);
        (svc, backend, registry)
    }

    #[tokio::test]
    async fn test_rebuild_indexes_all_documents() {
        let docs = vec![
            Document::new("a.txt", "First document body."),
            Document::new("b.txt", "Second document body."),
        ];
        let (svc, backend, registry) = service(docs);
        let session = Uuid::new_v4();

        svc.rebuild(session).await.unwrap();

        let indexed = backend.indexed.lock().unwrap();
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].len(), 2);
        assert!(registry.get(session).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rebuild_with_no_documents_installs_empty_engine() {
        let (svc, backend, registry) = service(Vec::new());
        let session = Uuid::new_v4();

        svc.rebuild(session).await.unwrap();

        assert!(backend.indexed.lock().unwrap()[0].is_empty());
        assert!(registry.get(session).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear_evicts_engine() {
        let (svc, _backend, registry) = service(Vec::new());
        let session = Uuid::new_v4();

        svc.rebuild(session).await.unwrap();
        svc.clear(session).await.unwrap();

        assert!(registry.get(session).unwrap().is_none());
    }
}
