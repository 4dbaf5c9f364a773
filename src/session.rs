//! Admin session record and token minting

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;

/// Length of the token prefix written to logs in place of the token itself
const FINGERPRINT_LEN: usize = 8;

/// A server-side admin session
///
/// Records are owned by a [`SessionStore`](crate::store::SessionStore);
/// callers only ever hold copies returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    /// Opaque lookup key, carried by the session cookie
    pub token: String,

    /// Identity of the authenticated principal (admin user id)
    pub subject: String,

    /// When the session was minted
    pub created_at: DateTime<Utc>,

    /// End of the validity window
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Mint a new session for `subject`, valid for `max_age_secs` seconds
    ///
    /// Every call produces a fresh token, so a deleted token is never
    /// handed out again.
    pub fn new<S: Into<String>>(subject: S, max_age_secs: u64) -> Self {
        let created_at = Utc::now();
        let expires_at = i64::try_from(max_age_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|max_age| created_at.checked_add_signed(max_age))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            token: generate_token(),
            subject: subject.into(),
            created_at,
            expires_at,
        }
    }

    /// Check if the session has passed its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Seconds left before expiry, rounded up; 0 once expired
    ///
    /// Rounding up keeps a store TTL from ending before `expires_at`.
    pub fn remaining_ttl(&self) -> u64 {
        let millis = (self.expires_at - Utc::now()).num_milliseconds();
        u64::try_from(millis).map_or(0, |ms| ms.div_ceil(1000))
    }

    /// Short prefix of the token, safe to log
    pub fn fingerprint(&self) -> &str {
        fingerprint(&self.token)
    }
}

/// Generate a new session token
///
/// 32 lowercase hex characters from a UUID v4.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Reject tokens the stores must never see
pub fn validate_token(token: &str) -> Result<&str, SessionError> {
    if token.is_empty() {
        return Err(SessionError::InvalidToken("token is empty".to_string()));
    }
    Ok(token)
}

/// Short prefix of a token, safe to log
pub fn fingerprint(token: &str) -> &str {
    match token.char_indices().nth(FINGERPRINT_LEN) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
