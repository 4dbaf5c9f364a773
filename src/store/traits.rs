//! Session store trait

use async_trait::async_trait;

use crate::error::SessionError;
use crate::session::AdminSession;

/// What a [`SessionStore::destroy`] call found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// A record was physically removed
    Deleted,
    /// Nothing was stored under the token
    AlreadyAbsent,
}

/// Trait for session storage backends
///
/// A store exclusively owns its records. Implementations must make
/// `destroy` a single atomic removal so that concurrent calls for one
/// token yield exactly one `Deleted`, and must never let a destroyed or
/// expired token resolve again.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Insert a new session.
    ///
    /// Fails with `SessionError::DuplicateToken` if the token is taken;
    /// existing records are never overwritten.
    async fn create(&self, session: &AdminSession) -> Result<(), SessionError>;

    /// Look up a session by token
    ///
    /// Returns None if the session doesn't exist or has expired
    async fn get(&self, token: &str) -> Result<Option<AdminSession>, SessionError>;

    /// Remove a session. A missing record is not an error.
    async fn destroy(&self, token: &str) -> Result<Removal, SessionError>;

    /// Remove expired sessions, returning how many were dropped.
    ///
    /// Stores whose backend expires keys natively keep the default.
    async fn cleanup_expired(&self) -> Result<usize, SessionError> {
        Ok(0)
    }

    /// Count live sessions (optional)
    async fn length(&self) -> Result<usize, SessionError> {
        Err(SessionError::StoreError("length not implemented".to_string()))
    }
}
