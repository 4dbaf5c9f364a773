//! Redis session store
//!
//! - Key: `prefix + token` (default prefix: "admin_sess:")
//! - Value: JSON serialized [`AdminSession`]
//! - TTL: remaining validity of the session, so Redis expires records itself

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;

use super::{Removal, SessionStore};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::session::{validate_token, AdminSession};

/// Redis session store
///
/// # Example
///
/// ```rust,ignore
/// use salvo_admin_session::RedisStore;
///
/// let client = redis::Client::open("redis://127.0.0.1/")?;
/// let store = RedisStore::new(client).await?;
/// ```
pub struct RedisStore {
    conn: Arc<ConnectionManager>,
    prefix: String,
}

impl RedisStore {
    /// Create a new Redis store with the default "admin_sess:" prefix
    pub async fn new(client: redis::Client) -> Result<Self, SessionError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::from_connection_manager(conn))
    }

    /// Create a new Redis store from a connection string
    pub async fn from_url(url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(url)
            .map_err(|e| SessionError::StoreError(format!("Failed to create Redis client: {}", e)))?;
        Self::new(client).await
    }

    /// Create a new Redis store keyed with `SessionConfig::prefix`
    pub async fn from_config(client: redis::Client, config: &SessionConfig) -> Result<Self, SessionError> {
        Ok(Self::new(client).await?.with_prefix(&config.prefix))
    }

    /// Create a new Redis store from an existing connection manager
    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self {
            conn: Arc::new(conn),
            prefix: "admin_sess:".to_string(),
        }
    }

    /// Build with custom key prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Make a storage key from a session token
    fn make_key(&self, token: &str) -> String {
        format!("{}{}", self.prefix, token)
    }

    fn connection(&self) -> ConnectionManager {
        (*self.conn).clone()
    }
}

impl Clone for RedisStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            prefix: self.prefix.clone(),
        }
    }
}

/// `EX` argument for a session, refusing sessions that are already over
fn expiry_secs(session: &AdminSession) -> Result<u64, SessionError> {
    match session.remaining_ttl() {
        0 => Err(SessionError::StoreError(
            "refusing to store an expired session".to_string(),
        )),
        ttl => Ok(ttl),
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn create(&self, session: &AdminSession) -> Result<(), SessionError> {
        let key = self.make_key(validate_token(&session.token)?);
        let ttl = expiry_secs(session)?;

        let json = serde_json::to_string(session)?;
        let mut conn = self.connection();

        // SET NX EX: only if vacant, with expiry, in one command
        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&json)
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut conn)
            .await?;

        match reply {
            Some(_) => Ok(()),
            None => Err(SessionError::DuplicateToken),
        }
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, SessionError> {
        let key = self.make_key(validate_token(token)?);
        let mut conn = self.connection();

        let data: Option<String> = conn.get(&key).await?;

        match data {
            Some(json) => {
                let session: AdminSession = serde_json::from_str(&json)?;

                // Redis TTL has second granularity
                if session.is_expired() {
                    return Ok(None);
                }

                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn destroy(&self, token: &str) -> Result<Removal, SessionError> {
        let key = self.make_key(validate_token(token)?);
        let mut conn = self.connection();

        let removed: usize = conn.del(&key).await?;
        Ok(if removed > 0 {
            Removal::Deleted
        } else {
            Removal::AlreadyAbsent
        })
    }

    async fn length(&self) -> Result<usize, SessionError> {
        let mut conn = self.connection();

        let pattern = format!("{}*", self.prefix);
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await?;

        Ok(keys.len())
    }
}
