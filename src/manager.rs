//! Session manager: the single entry point to the store
//!
//! Handlers never talk to a [`SessionStore`] directly. The manager mints
//! sessions, resolves tokens and deletes sessions, and decides what a store
//! failure means for each of those flows.

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::session::{fingerprint, validate_token, AdminSession};
use crate::store::{Removal, SessionStore};
use crate::sweeper::ExpirySweeper;

/// Result of [`SessionManager::delete_session`]
///
/// Every variant counts as a successful logout for the user. `Failed` only
/// matters for operational visibility: a record may linger until it expires.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The session record was removed
    Deleted,
    /// No record existed (already logged out or expired)
    AlreadyAbsent,
    /// The store could not be reached or refused the deletion
    Failed(SessionError),
}

impl DeleteOutcome {
    /// Whether the server-side record may still exist
    pub fn is_failure(&self) -> bool {
        matches!(self, DeleteOutcome::Failed(_))
    }
}

impl From<Removal> for DeleteOutcome {
    fn from(removal: Removal) -> Self {
        match removal {
            Removal::Deleted => DeleteOutcome::Deleted,
            Removal::AlreadyAbsent => DeleteOutcome::AlreadyAbsent,
        }
    }
}

/// Shared handle over a session store and its configuration
pub struct SessionManager<S: SessionStore> {
    store: Arc<S>,
    config: Arc<SessionConfig>,
}

impl<S: SessionStore> SessionManager<S> {
    /// Create a manager, validating the configuration
    pub fn new(store: S, config: SessionConfig) -> Result<Self, SessionError> {
        Self::from_shared(Arc::new(store), config)
    }

    /// Create a manager over a store that is already shared elsewhere
    pub fn from_shared(store: Arc<S>, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mint and persist a session for an authenticated principal
    pub async fn login(&self, subject: &str) -> Result<AdminSession, SessionError> {
        if subject.is_empty() {
            return Err(SessionError::InvalidSubject);
        }

        let session = AdminSession::new(subject, self.config.max_age);
        self.store.create(&session).await?;

        tracing::info!(
            subject = %session.subject,
            token = %session.fingerprint(),
            expires_at = %session.expires_at,
            "Admin session created"
        );
        Ok(session)
    }

    /// Resolve a token to an active session
    ///
    /// `Ok(None)` means the store has no live session for the token. Store
    /// failures are logged and returned so callers can tell an outage from a
    /// logged-out user.
    pub async fn resolve(&self, token: &str) -> Result<Option<AdminSession>, SessionError> {
        if token.is_empty() {
            return Ok(None);
        }

        self.store.get(token).await.map_err(|e| {
            tracing::error!(error = %e, token = %fingerprint(token), "Failed to load session");
            e
        })
    }

    /// Delete a session, never failing
    ///
    /// Missing sessions are a no-op. Store errors are logged and returned as
    /// [`DeleteOutcome::Failed`] for the caller to ignore.
    pub async fn delete_session(&self, token: &str) -> DeleteOutcome {
        if let Err(e) = validate_token(token) {
            tracing::debug!(error = %e, "Skipping session deletion");
            return DeleteOutcome::AlreadyAbsent;
        }

        let outcome = match self.store.destroy(token).await {
            Ok(removal) => DeleteOutcome::from(removal),
            Err(e) => DeleteOutcome::Failed(e),
        };

        match &outcome {
            DeleteOutcome::Deleted => {
                tracing::info!(token = %fingerprint(token), "Admin session deleted");
            }
            DeleteOutcome::AlreadyAbsent => {
                tracing::debug!(token = %fingerprint(token), "Admin session already absent");
            }
            DeleteOutcome::Failed(e) => {
                tracing::error!(
                    error = %e,
                    token = %fingerprint(token),
                    "Failed to delete admin session, record remains until expiry"
                );
            }
        }
        outcome
    }

    /// Build an expiry sweeper over the same store
    pub fn sweeper(&self) -> ExpirySweeper<S> {
        ExpirySweeper::new(Arc::clone(&self.store), self.config.sweep_interval)
    }
}

impl<S: SessionStore> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}
