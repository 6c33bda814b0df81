use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::application::services::{EngineRegistry, IndexService};
use crate::domain::{
    ports::{QueryEngine, RetrievalBackend},
    ChatTurn, DomainError,
};

/// Formats the trailing window of a transcript plus the new message into the
/// flat prompt the query engine expects. Turns beyond the window are dropped
/// without summarization.
pub fn build_prompt(history: &[ChatTurn], message: &str, window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let context = history[start..]
        .iter()
        .map(|turn| format!("<|USER|>{}\n<|ASSISTANT|>{}", turn.human, turn.assistant))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{context}\n<|USER|>{message}<|ASSISTANT|>")
}

/// Orchestrates one chat turn: optional reindex, context assembly, one
/// blocking query against the session's engine. No retry, no streaming.
pub struct ChatService {
    index: Arc<IndexService>,
    registry: Arc<EngineRegistry>,
    backend: Arc<dyn RetrievalBackend>,
    history_window: usize,
}

impl ChatService {
    pub fn new(
        index: Arc<IndexService>,
        registry: Arc<EngineRegistry>,
        backend: Arc<dyn RetrievalBackend>,
        history_window: usize,
    ) -> Self {
        Self {
            index,
            registry,
            backend,
            history_window,
        }
    }

    #[instrument(skip(self, history, message), fields(turns = history.len()))]
    pub async fn respond(
        &self,
        session: Uuid,
        history: &[ChatTurn],
        message: &str,
        reindex: bool,
    ) -> Result<String, DomainError> {
        if reindex {
            self.index.rebuild(session).await?;
        }

        let engine = self.engine_for(session).await?;
        let prompt = build_prompt(history, message, self.history_window);
        engine.query(&prompt).await
    }

    /// Sessions that never uploaded anything get an engine over zero
    /// documents, so queries answer without retrieved context.
    async fn engine_for(&self, session: Uuid) -> Result<Arc<dyn QueryEngine>, DomainError> {
        if let Some(engine) = self.registry.get(session)? {
            return Ok(engine);
        }

        let engine = self.backend.index(Vec::new()).await?;
        self.registry.swap(session, engine.clone())?;
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ports::DocumentStore, Document, DocumentChunk, StoredFile};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn test_prompt_format() {
        let history = vec![ChatTurn::new("hi", "hello")];
        let prompt = build_prompt(&history, "bye", 10);
        assert_eq!(prompt, "<|USER|>hi\n<|ASSISTANT|>hello\n<|USER|>bye<|ASSISTANT|>");
    }

    #[test]
    fn test_prompt_empty_history_keeps_leading_newline() {
        let prompt = build_prompt(&[], "hello", 10);
        assert_eq!(prompt, "\n<|USER|>hello<|ASSISTANT|>");
    }

    #[test]
    fn test_prompt_window_drops_oldest_turns() {
        let history: Vec<ChatTurn> = (0..12)
            .map(|i| ChatTurn::new(format!("q{i}"), format!("a{i}")))
            .collect();
        let prompt = build_prompt(&history, "next", 10);

        // match whole formatted turns; "q1" alone would also hit q10/q11
        assert!(!prompt.contains("<|USER|>q0\n"));
        assert!(!prompt.contains("<|USER|>q1\n"));
        assert!(prompt.contains("<|USER|>q2\n"));
        assert!(prompt.contains("<|USER|>q11\n"));
        assert!(prompt.ends_with("<|USER|>next<|ASSISTANT|>"));
    }

    struct SingleDocStore;

    #[async_trait]
    impl DocumentStore for SingleDocStore {
        async fn save(
            &self,
            _session: Uuid,
            _original_name: &str,
            _bytes: &[u8],
        ) -> Result<StoredFile, DomainError> {
            unimplemented!("not used in these tests")
        }

        async fn load_all(&self, _session: Uuid) -> Result<Vec<Document>, DomainError> {
            Ok(vec![Document::new("doc.txt", "stored content")])
        }

        async fn clear(&self, _session: Uuid) -> Result<(), DomainError> {
            Ok(())
        }

        async fn clear_all(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct EchoEngine(usize);

    #[async_trait]
    impl QueryEngine for EchoEngine {
        async fn query(&self, prompt: &str) -> Result<String, DomainError> {
            Ok(format!("gen{}:{prompt}", self.0))
        }
    }

    struct CountingBackend {
        builds: Mutex<usize>,
    }

    #[async_trait]
    impl RetrievalBackend for CountingBackend {
        async fn index(
            &self,
            _chunks: Vec<DocumentChunk>,
        ) -> Result<Arc<dyn QueryEngine>, DomainError> {
            let mut builds = self.builds.lock().unwrap();
            *builds += 1;
            Ok(Arc::new(EchoEngine(*builds)))
        }
    }

    fn chat_service() -> (ChatService, Arc<CountingBackend>) {
        let backend = Arc::new(CountingBackend {
            builds: Mutex::new(0),
        });
        let registry = Arc::new(EngineRegistry::new());
        let index = Arc::new(IndexService::new(
            Arc::new(SingleDocStore),
            backend.clone(),
            registry.clone(),
            1000,
        ));
        (
            ChatService::new(index, registry, backend.clone(), 10),
            backend,
        )
    }

    #[tokio::test]
    async fn test_respond_without_reindex_reuses_engine() {
        let (svc, backend) = chat_service();
        let session = Uuid::new_v4();

        svc.respond(session, &[], "one", false).await.unwrap();
        svc.respond(session, &[], "two", false).await.unwrap();

        // first call lazily builds the empty engine; second reuses it
        assert_eq!(*backend.builds.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_respond_with_reindex_swaps_engine() {
        let (svc, backend) = chat_service();
        let session = Uuid::new_v4();

        let first = svc.respond(session, &[], "one", false).await.unwrap();
        let second = svc.respond(session, &[], "two", true).await.unwrap();

        assert_eq!(*backend.builds.lock().unwrap(), 2);
        assert!(first.starts_with("gen1:"));
        assert!(second.starts_with("gen2:"));
    }
}
