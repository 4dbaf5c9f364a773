//! Postgres session store
//!
//! Sessions live in one table keyed by token. The primary key is the
//! uniqueness guarantee; expired rows are filtered on read and removed by
//! [`SessionStore::cleanup_expired`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::{Removal, SessionStore};
use crate::error::SessionError;
use crate::session::{fingerprint, validate_token, AdminSession};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS admin_sessions (
    token TEXT PRIMARY KEY,
    subject TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL
)";

const CREATE_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS admin_sessions_expires_at_idx ON admin_sessions (expires_at)";

/// Postgres-backed session store
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool from a `postgres://` URL
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        let pool = PgPool::connect(url).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect session database");
            SessionError::DatabaseError(e)
        })?;
        Ok(Self::new(pool))
    }

    /// Create the sessions table and its expiry index if missing
    pub async fn ensure_schema(&self) -> Result<(), SessionError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_EXPIRY_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn create(&self, session: &AdminSession) -> Result<(), SessionError> {
        validate_token(&session.token)?;

        let result = sqlx::query(
            "INSERT INTO admin_sessions (token, subject, created_at, expires_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (token) DO NOTHING",
        )
        .bind(&session.token)
        .bind(&session.subject)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, token = %session.fingerprint(), "Failed to insert session");
            SessionError::DatabaseError(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(SessionError::DuplicateToken);
        }
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, SessionError> {
        validate_token(token)?;

        let row = sqlx::query(
            "SELECT token, subject, created_at, expires_at FROM admin_sessions \
             WHERE token = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, token = %fingerprint(token), "Failed to load session");
            SessionError::DatabaseError(e)
        })?;

        row.map(|row| -> Result<AdminSession, SessionError> {
            Ok(AdminSession {
                token: row.try_get("token")?,
                subject: row.try_get("subject")?,
                created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
                expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
            })
        })
        .transpose()
    }

    async fn destroy(&self, token: &str) -> Result<Removal, SessionError> {
        validate_token(token)?;

        let result = sqlx::query("DELETE FROM admin_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, token = %fingerprint(token), "Failed to delete session");
                SessionError::DatabaseError(e)
            })?;

        Ok(if result.rows_affected() > 0 {
            Removal::Deleted
        } else {
            Removal::AlreadyAbsent
        })
    }

    async fn cleanup_expired(&self) -> Result<usize, SessionError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to delete expired sessions");
                SessionError::DatabaseError(e)
            })?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn length(&self) -> Result<usize, SessionError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM admin_sessions WHERE expires_at > now()")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to count sessions");
                    SessionError::DatabaseError(e)
                })?;
        usize::try_from(count)
            .map_err(|_| SessionError::StoreError(format!("Invalid session count: {}", count)))
    }
}
