//! In-memory session store
//!
//! This is primarily for development, tests and single-instance deployments.
//! Sessions are lost on restart and are not shared across processes.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Removal, SessionStore};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::session::{validate_token, AdminSession};

/// In-memory session store
///
/// Expired records stop resolving immediately but stay in the map until
/// [`MemoryStore::cleanup_expired`] runs, usually from an
/// [`ExpirySweeper`](crate::sweeper::ExpirySweeper).
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
    prefix: String,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new() -> Self {
        Self::with_prefix("admin_sess:")
    }

    /// Create a new memory store with a custom prefix
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            prefix: prefix.into(),
        }
    }

    /// Create a new memory store keyed with `SessionConfig::prefix`
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::with_prefix(config.prefix.clone())
    }

    /// Make a storage key from a session token
    fn make_key(&self, token: &str) -> String {
        format!("{}{}", self.prefix, token)
    }

    /// Drop expired sessions, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            prefix: self.prefix.clone(),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, session: &AdminSession) -> Result<(), SessionError> {
        let key = self.make_key(validate_token(&session.token)?);

        match self.sessions.write().entry(key) {
            Entry::Occupied(_) => Err(SessionError::DuplicateToken),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, SessionError> {
        let key = self.make_key(validate_token(token)?);
        let sessions = self.sessions.read();

        Ok(sessions
            .get(&key)
            .filter(|session| !session.is_expired())
            .cloned())
    }

    async fn destroy(&self, token: &str) -> Result<Removal, SessionError> {
        let key = self.make_key(validate_token(token)?);

        match self.sessions.write().remove(&key) {
            Some(_) => Ok(Removal::Deleted),
            None => Ok(Removal::AlreadyAbsent),
        }
    }

    async fn cleanup_expired(&self) -> Result<usize, SessionError> {
        Ok(self.purge_expired())
    }

    async fn length(&self) -> Result<usize, SessionError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .values()
            .filter(|session| session.expires_at > now)
            .count())
    }
}
