mod chat;
mod document;
mod embedding;

pub use chat::ChatTurn;
pub use document::{chunk_content, Document, DocumentChunk, SearchResult, StoredFile};
pub use embedding::Embedding;
