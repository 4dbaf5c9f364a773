//! Session error types

use std::fmt;

/// Errors that can occur during session operations
#[derive(Debug)]
pub enum SessionError {
    /// Error from the session store
    StoreError(String),
    /// Error during serialization/deserialization
    SerializationError(String),
    /// Token rejected before reaching the store
    InvalidToken(String),
    /// Login attempted without a principal
    InvalidSubject,
    /// A record already exists under the token being created
    DuplicateToken,
    /// Configuration rejected by `SessionConfig::validate`
    InvalidConfig(String),
    /// Redis error (when redis-store feature is enabled)
    #[cfg(feature = "redis-store")]
    RedisError(redis::RedisError),
    /// Database error (when postgres-store feature is enabled)
    #[cfg(feature = "postgres-store")]
    DatabaseError(sqlx::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::StoreError(msg) => write!(f, "Session store error: {}", msg),
            SessionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            SessionError::InvalidToken(msg) => write!(f, "Invalid session token: {}", msg),
            SessionError::InvalidSubject => write!(f, "Session subject must not be empty"),
            SessionError::DuplicateToken => write!(f, "Session token already exists"),
            SessionError::InvalidConfig(msg) => write!(f, "Invalid session config: {}", msg),
            #[cfg(feature = "redis-store")]
            SessionError::RedisError(e) => write!(f, "Redis error: {}", e),
            #[cfg(feature = "postgres-store")]
            SessionError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "redis-store")]
            SessionError::RedisError(e) => Some(e),
            #[cfg(feature = "postgres-store")]
            SessionError::DatabaseError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "redis-store")]
impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::RedisError(err)
    }
}

#[cfg(feature = "postgres-store")]
impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        SessionError::DatabaseError(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}
