//! Session persistence trait.

use async_trait::async_trait;
use huntchapter_core::{Session, SessionId, SessionSummary};
use huntchapter_error::HuntChapterResult;

/// Storage for session records.
///
/// The engine never depends on a storage technology; hosts save the record
/// it exposes after each operation and hand it back to resume play.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert or replace a session.
    async fn save(&self, session: &Session) -> HuntChapterResult<()>;

    /// Load a session by id.
    ///
    /// # Errors
    ///
    /// Fails with a not-found storage error when no such session exists.
    async fn load(&self, id: SessionId) -> HuntChapterResult<Session>;

    /// Remove a session. Removing an unknown id is not an error.
    async fn delete(&self, id: SessionId) -> HuntChapterResult<()>;

    /// Summaries of every stored session, newest first.
    async fn list(&self) -> HuntChapterResult<Vec<SessionSummary>>;
}
