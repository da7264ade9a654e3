//! Session repositories: in memory and a single JSON file.

use async_trait::async_trait;
use huntchapter_core::{Session, SessionId, SessionSummary};
use huntchapter_error::{HuntChapterResult, StorageError, StorageErrorKind};
use huntchapter_interface::SessionRepository;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

fn not_found(id: SessionId) -> StorageError {
    StorageError::new(StorageErrorKind::NotFound(id.to_string()))
}

fn newest_first<'a>(sessions: impl Iterator<Item = &'a Session>) -> Vec<SessionSummary> {
    let mut summaries: Vec<SessionSummary> = sessions.map(Session::summary).collect();
    summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    summaries
}

/// In-memory session repository.
///
/// Sessions live in a HashMap behind an RwLock and are lost when the last
/// clone of the repository is dropped.
///
/// # Example
/// ```no_run
/// use huntchapter_story::InMemorySessionRepository;
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemorySessionRepository::new();
///     assert!(repo.is_empty().await);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &Session) -> HuntChapterResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn load(&self, id: SessionId) -> HuntChapterResult<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id).into())
    }

    async fn delete(&self, id: SessionId) -> HuntChapterResult<()> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn list(&self) -> HuntChapterResult<Vec<SessionSummary>> {
        Ok(newest_first(self.sessions.read().await.values()))
    }
}

/// Session repository persisted as one JSON document.
///
/// The document maps session ids to session records. It is read on every
/// access and rewritten on every change; a missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileSessionRepository {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSessionRepository {
    /// Repository backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<SessionId, Session>, StorageError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                ))));
            }
        };
        if data.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&data)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))
    }

    async fn write_all(&self, sessions: &HashMap<SessionId, Session>) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(sessions)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        tokio::fs::write(&self.path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    #[instrument(skip(self, session), fields(path = %self.path.display(), session = %session.id))]
    async fn save(&self, session: &Session) -> HuntChapterResult<()> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_all().await?;
        sessions.insert(session.id, session.clone());
        self.write_all(&sessions).await?;
        debug!(stored = sessions.len(), "Session saved");
        Ok(())
    }

    async fn load(&self, id: SessionId) -> HuntChapterResult<Session> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_all().await?;
        sessions.remove(&id).ok_or_else(|| not_found(id).into())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn delete(&self, id: SessionId) -> HuntChapterResult<()> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_all().await?;
        if sessions.remove(&id).is_some() {
            self.write_all(&sessions).await?;
            debug!(session = %id, "Session deleted");
        }
        Ok(())
    }

    async fn list(&self) -> HuntChapterResult<Vec<SessionSummary>> {
        let _guard = self.lock.lock().await;
        let sessions = self.read_all().await?;
        Ok(newest_first(sessions.values()))
    }
}
