//! Session lifecycle
//!
//! The session token is owned by a [`Session`] value that pages inject into
//! the client. Its lifecycle is explicit: [`Session::load`] at process start,
//! [`Session::set`] on login and [`Session::clear`] on logout or when the API
//! rejects the credentials.

mod navigator;
mod store;

pub use navigator::*;
pub use store::*;

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::SessionError;

/// The persisted login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// ID of the signed-in user.
    #[serde(default)]
    pub id: Option<String>,
    /// Username of the signed-in user.
    #[serde(default)]
    pub username: Option<String>,
    /// Bearer token sent with every request.
    pub token: String,
    /// Refresh token issued alongside the access token.
    #[serde(default)]
    pub refresh: Option<String>,
}

impl SessionRecord {
    /// Creates a record holding only an access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            id: None,
            username: None,
            token: token.into(),
            refresh: None,
        }
    }

    pub fn with_user(mut self, id: impl Into<String>, username: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.username = Some(username.into());
        self
    }

    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = Some(refresh.into());
        self
    }
}

/// Shared session handle.
///
/// Cheap to clone; all clones observe the same record.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    record: RwLock<Option<SessionRecord>>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Loads the persisted session from `store`.
    pub async fn load(store: impl SessionStore + 'static) -> Result<Self, SessionError> {
        let store: Arc<dyn SessionStore> = Arc::new(store);
        let record = store.load().await?;
        log::debug!("Session loaded (authenticated: {})", record.is_some());
        Ok(Self {
            inner: Arc::new(SessionInner {
                record: RwLock::new(record),
                store,
            }),
        })
    }

    /// Creates a session with no persisted state.
    pub fn anonymous() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                record: RwLock::new(None),
                store: Arc::new(MemoryStore::new()),
            }),
        }
    }

    /// Persists `record` and makes it the current session.
    pub async fn set(&self, record: SessionRecord) -> Result<(), SessionError> {
        self.inner.store.save(&record).await?;
        *self.inner.record.write().await = Some(record);
        log::info!("Session established");
        Ok(())
    }

    /// Removes the persisted and in-memory session.
    ///
    /// The in-memory record is dropped even if the store fails.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.inner.record.write().await.take();
        self.inner.store.clear().await?;
        log::info!("Session cleared");
        Ok(())
    }

    /// Returns the current access token.
    pub async fn token(&self) -> Option<String> {
        self.inner
            .record
            .read()
            .await
            .as_ref()
            .map(|r| r.token.clone())
    }

    /// Returns a copy of the current record.
    pub async fn record(&self) -> Option<SessionRecord> {
        self.inner.record.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.record.read().await.is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
