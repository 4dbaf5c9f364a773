//! Store doubles for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Removal, SessionStore};
use crate::error::SessionError;
use crate::session::AdminSession;

/// A store whose backend is never reachable. Counts every call.
#[derive(Clone, Default)]
pub struct UnreachableStore {
    calls: Arc<AtomicUsize>,
}

impl UnreachableStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SessionError::StoreError("connection refused".to_string()))
    }
}

#[async_trait]
impl SessionStore for UnreachableStore {
    async fn create(&self, _session: &AdminSession) -> Result<(), SessionError> {
        self.fail()
    }

    async fn get(&self, _token: &str) -> Result<Option<AdminSession>, SessionError> {
        self.fail()
    }

    async fn destroy(&self, _token: &str) -> Result<Removal, SessionError> {
        self.fail()
    }

    async fn cleanup_expired(&self) -> Result<usize, SessionError> {
        self.fail()
    }
}
