use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::domain::{ports::DocumentStore, Document, DomainError, StoredFile};

/// Filesystem-backed upload store. Each session gets its own subdirectory
/// under the upload root; stored names carry a `YYYYMMDD_HHMMSS_` prefix.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_dir(&self, session: Uuid) -> PathBuf {
        self.root.join(session.to_string())
    }

    /// Same-second uploads of the same name collide on the timestamp prefix;
    /// a numeric suffix is inserted until a free name is found.
    async fn free_path(
        &self,
        dir: &Path,
        timestamp: &str,
        original_name: &str,
    ) -> Result<PathBuf, DomainError> {
        let candidate = dir.join(format!("{timestamp}_{original_name}"));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        for n in 1.. {
            let candidate = dir.join(format!("{timestamp}_{n}_{original_name}"));
            if !tokio::fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        unreachable!()
    }

    /// Stored file names for a session, in name order.
    pub async fn list(&self, session: Uuid) -> Result<Vec<String>, DomainError> {
        let dir = self.session_dir(session);
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn save(
        &self,
        session: Uuid,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, DomainError> {
        let dir = self.session_dir(session);
        tokio::fs::create_dir_all(&dir).await?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self.free_path(&dir, &timestamp, original_name).await?;
        tokio::fs::write(&path, bytes).await?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(%session, name, "upload saved");

        Ok(StoredFile { name, path })
    }

    async fn load_all(&self, session: Uuid) -> Result<Vec<Document>, DomainError> {
        let dir = self.session_dir(session);
        let names = self.list(session).await?;

        let mut docs = Vec::with_capacity(names.len());
        for name in names {
            let bytes = tokio::fs::read(dir.join(&name)).await?;
            // parsing is out of scope; everything is treated as text
            let content = String::from_utf8_lossy(&bytes).into_owned();
            docs.push(Document::new(name, content));
        }
        Ok(docs)
    }

    async fn clear(&self, session: Uuid) -> Result<(), DomainError> {
        let dir = self.session_dir(session);
        if tokio::fs::try_exists(&dir).await? {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), DomainError> {
        if !tokio::fs::try_exists(&self.root).await? {
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(entry.path()).await?;
            } else {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }
        Ok(())
    }
}
