pub mod config;
pub mod embedding;
pub mod engine;
pub mod llm;
pub mod storage;
pub mod vector_store;

pub use config::Config;
pub use embedding::TextEmbedding;
pub use engine::RagBackend;
pub use llm::AnthropicLlm;
pub use storage::FsDocumentStore;
pub use vector_store::InMemoryVectorStore;
