//! Session persistence backends.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::SessionRecord;
use crate::error::SessionError;

/// Backend trait for session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads the persisted record, if any.
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError>;

    /// Persists `record`, replacing any previous one.
    async fn save(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// Removes the persisted record. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// In-memory store. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `record`.
    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        *self.record.lock().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.record.lock().await.take();
        Ok(())
    }
}

/// JSON-file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn load(&self) -> Result<Option<SessionRecord>, SessionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
