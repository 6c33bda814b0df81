mod document_store;
mod embedding;
mod engine;
mod llm;
mod vector_store;

pub use document_store::DocumentStore;
pub use embedding::EmbeddingService;
pub use engine::{QueryEngine, RetrievalBackend};
pub use llm::LlmService;
pub use vector_store::VectorStore;
