use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Document, StoredFile};

/// Upload storage, scoped per session. `save` accepts arbitrary bytes with no
/// content-type or size validation; `load_all` returns every document
/// currently stored for the session, in stored-name order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(
        &self,
        session: Uuid,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, DomainError>;
    async fn load_all(&self, session: Uuid) -> Result<Vec<Document>, DomainError>;
    async fn clear(&self, session: Uuid) -> Result<(), DomainError>;
    async fn clear_all(&self) -> Result<(), DomainError>;
}
