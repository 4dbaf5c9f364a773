//! Session configuration

use std::time::Duration;

use crate::error::SessionError;

/// Longest validity window accepted for a session (one year)
const MAX_SESSION_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration shared by the session manager, handlers and sweeper
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Secret key(s) for signing cookies.
    /// Empty means the cookie carries the bare token.
    /// The first secret signs; all secrets are tried when verifying (rotation).
    pub secrets: Vec<String>,

    /// Name of the session cookie (default: "admin_session")
    pub cookie_name: String,

    /// Cookie path (default: "/")
    pub cookie_path: String,

    /// Cookie domain (default: None - current domain only)
    pub cookie_domain: Option<String>,

    /// HttpOnly flag for cookie (default: true)
    pub cookie_http_only: bool,

    /// Secure flag for cookie (default: false)
    pub cookie_secure: bool,

    /// SameSite attribute for cookie
    pub cookie_same_site: SameSite,

    /// Session validity window in seconds (default: 86400).
    /// Used for the cookie Max-Age and the store TTL.
    pub max_age: u64,

    /// Session key prefix in key-value stores (default: "admin_sess:")
    pub prefix: String,

    /// Where logout and rejected requests are redirected (default: "/admin/login")
    pub login_path: String,

    /// How often the expiry sweeper runs (default: 5 minutes)
    pub sweep_interval: Duration,
}

/// SameSite cookie attribute
#[derive(Clone, Debug, PartialEq)]
pub enum SameSite {
    /// Strict - cookie only sent for same-site requests
    Strict,
    /// Lax - cookie sent for same-site requests and top-level navigations
    Lax,
    /// None - cookie sent for all requests (requires Secure)
    None,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secrets: Vec::new(),
            cookie_name: "admin_session".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_http_only: true,
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            max_age: 86400,
            prefix: "admin_sess:".to_string(),
            login_path: "/admin/login".to_string(),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default settings and unsigned cookies
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign cookies with a single secret
    pub fn with_secret<S: Into<String>>(mut self, secret: S) -> Self {
        self.secrets = vec![secret.into()];
        self
    }

    /// Sign cookies with the first of several secrets, accepting all of them
    pub fn with_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secrets = secrets.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Set the cookie name (default: "admin_session")
    pub fn with_cookie_name<S: Into<String>>(mut self, name: S) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the cookie path (default: "/")
    pub fn with_cookie_path<S: Into<String>>(mut self, path: S) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Set the cookie domain
    pub fn with_cookie_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Set the HttpOnly flag (default: true)
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    /// Set the Secure flag (default: false)
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Set the SameSite attribute (default: Lax)
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    /// Set the session validity window in seconds
    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the session validity window from a Duration
    pub fn with_max_age_duration(mut self, duration: Duration) -> Self {
        self.max_age = duration.as_secs();
        self
    }

    /// Set the session key prefix in store (default: "admin_sess:")
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the login page path (default: "/admin/login")
    pub fn with_login_path<S: Into<String>>(mut self, path: S) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set how often expired sessions are swept (default: 5 minutes)
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Duration {
        Duration::from_secs(self.max_age)
    }

    /// Whether cookie values carry an HMAC signature
    pub fn signs_cookies(&self) -> bool {
        !self.secrets.is_empty()
    }

    /// Check the settings the handlers rely on
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.cookie_name.is_empty() {
            return Err(invalid("cookie name must not be empty"));
        }
        if !self.cookie_name.chars().all(is_cookie_name_char) {
            return Err(invalid("cookie name contains characters not allowed in a cookie name"));
        }
        if self.max_age == 0 || self.max_age > MAX_SESSION_AGE_SECS {
            return Err(invalid("max age must be between 1 second and 1 year"));
        }
        if !self.login_path.starts_with('/') {
            return Err(invalid("login path must start with '/'"));
        }
        if !self.login_path.chars().all(|c| c.is_ascii_graphic()) {
            return Err(invalid("login path must be printable ASCII without spaces"));
        }
        if self.secrets.iter().any(|s| s.is_empty()) {
            return Err(invalid("signing secrets must not be empty"));
        }
        if self.sweep_interval.is_zero() {
            return Err(invalid("sweep interval must be greater than 0"));
        }
        if self.cookie_same_site == SameSite::None && !self.cookie_secure {
            return Err(invalid("SameSite=None requires the Secure flag"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> SessionError {
    SessionError::InvalidConfig(msg.to_string())
}

// RFC 6265 token characters
fn is_cookie_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
