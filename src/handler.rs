//! Salvo handlers for the admin session lifecycle
//!
//! - [`LogoutHandler`]: deletes the server-side session and always redirects
//!   to the login page with the cookie cleared.
//! - [`RequireAdmin`]: guard middleware that resolves the session cookie and
//!   exposes the session through [`SessionDepotExt`](crate::SessionDepotExt).
//! - [`start_session`]: for the application's login route, once credentials
//!   have been checked.

use salvo_core::http::cookie::{self, Cookie};
use salvo_core::http::header::{HeaderValue, LOCATION};
use salvo_core::prelude::*;

use crate::config::{SameSite, SessionConfig};
use crate::cookie_signature;
use crate::depot_ext::SESSION_KEY;
use crate::error::SessionError;
use crate::manager::SessionManager;
use crate::session::AdminSession;
use crate::store::SessionStore;

/// Logout endpoint
///
/// Mount on a POST route. The response is a `303 See Other` to the login
/// path with a removal cookie, whether or not a server-side session existed
/// and whether or not the store could be reached.
pub struct LogoutHandler<S: SessionStore> {
    manager: SessionManager<S>,
}

impl<S: SessionStore> LogoutHandler<S> {
    /// Create a logout handler
    pub fn new(manager: SessionManager<S>) -> Self {
        Self { manager }
    }
}

impl<S: SessionStore> Clone for LogoutHandler<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
        }
    }
}

#[async_trait]
impl<S: SessionStore> Handler for LogoutHandler<S> {
    async fn handle(&self, req: &mut Request, _depot: &mut Depot, res: &mut Response, _ctrl: &mut FlowCtrl) {
        let config = self.manager.config();

        match read_token(req, config) {
            // Outcome already logged by the manager; the user is logged out either way
            Some(token) => {
                self.manager.delete_session(&token).await;
            }
            None => {
                tracing::debug!("Logout without a usable session cookie");
            }
        }

        res.add_cookie(removal_cookie(config));
        redirect_to_login(res, config);
    }
}

/// Guard middleware for admin routes
///
/// With an active session the request continues and the session is
/// available from the depot. Otherwise the request is redirected to the
/// login path and the rest of the chain is skipped. The cookie is cleared
/// only when the store confirms there is no session; during a store outage
/// the client keeps its cookie.
pub struct RequireAdmin<S: SessionStore> {
    manager: SessionManager<S>,
}

impl<S: SessionStore> RequireAdmin<S> {
    /// Create a guard
    pub fn new(manager: SessionManager<S>) -> Self {
        Self { manager }
    }
}

impl<S: SessionStore> Clone for RequireAdmin<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
        }
    }
}

#[async_trait]
impl<S: SessionStore> Handler for RequireAdmin<S> {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        let config = self.manager.config();

        let Some(token) = read_token(req, config) else {
            if req.cookie(&config.cookie_name).is_some() {
                res.add_cookie(removal_cookie(config));
            }
            redirect_to_login(res, config);
            ctrl.skip_rest();
            return;
        };

        match self.manager.resolve(&token).await {
            Ok(Some(session)) => {
                depot.insert(SESSION_KEY, session);
                ctrl.call_next(req, depot, res).await;
            }
            Ok(None) => {
                res.add_cookie(removal_cookie(config));
                redirect_to_login(res, config);
                ctrl.skip_rest();
            }
            // Already logged by the manager; the cookie may still be valid
            Err(_) => {
                redirect_to_login(res, config);
                ctrl.skip_rest();
            }
        }
    }
}

/// Mint a session for `subject` and set its cookie on the response
pub async fn start_session<S: SessionStore>(
    manager: &SessionManager<S>,
    subject: &str,
    res: &mut Response,
) -> Result<AdminSession, SessionError> {
    let session = manager.login(subject).await?;
    let config = manager.config();

    let value = cookie_signature::encode(&session.token, &config.secrets);
    res.add_cookie(session_cookie(config, value));
    Ok(session)
}

/// Get the session token from the request cookie
///
/// `None` when the cookie is absent, empty or fails signature checks.
fn read_token(req: &Request, config: &SessionConfig) -> Option<String> {
    let raw = req.cookie(&config.cookie_name)?.value();

    // URL decode the value (cookies may be URL encoded)
    let decoded = match urlencoding::decode(raw) {
        Ok(d) => d.into_owned(),
        Err(_) => raw.to_string(),
    };

    let token = cookie_signature::decode(&decoded, &config.secrets);
    if token.is_none() && !decoded.is_empty() {
        tracing::warn!(cookie = %config.cookie_name, "Rejected session cookie with a bad signature");
    }
    token.map(str::to_string)
}

fn session_cookie(config: &SessionConfig, value: String) -> Cookie<'static> {
    let max_age = i64::try_from(config.max_age).unwrap_or(i64::MAX);

    let mut builder = Cookie::build((config.cookie_name.clone(), value))
        .path(config.cookie_path.clone())
        .http_only(config.cookie_http_only)
        .secure(config.cookie_secure)
        .max_age(cookie::time::Duration::seconds(max_age));

    if let Some(domain) = &config.cookie_domain {
        builder = builder.domain(domain.clone());
    }

    builder = match config.cookie_same_site {
        SameSite::Strict => builder.same_site(cookie::SameSite::Strict),
        SameSite::Lax => builder.same_site(cookie::SameSite::Lax),
        SameSite::None => builder.same_site(cookie::SameSite::None),
    };

    builder.build()
}

/// Cookie instructing the client to drop the session cookie
fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut builder = Cookie::build((config.cookie_name.clone(), String::new()))
        .path(config.cookie_path.clone())
        .http_only(config.cookie_http_only)
        .secure(config.cookie_secure);

    if let Some(domain) = &config.cookie_domain {
        builder = builder.domain(domain.clone());
    }

    let mut cookie = builder.build();
    cookie.make_removal();
    cookie
}

fn redirect_to_login(res: &mut Response, config: &SessionConfig) {
    // login_path is checked by SessionConfig::validate
    let location = HeaderValue::from_str(&config.login_path).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = %config.login_path, "Invalid login path, redirecting to /");
        HeaderValue::from_static("/")
    });

    res.status_code(StatusCode::SEE_OTHER);
    res.headers_mut().insert(LOCATION, location);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depot_ext::SessionDepotExt;
    use crate::store::testing::UnreachableStore;
    use crate::store::MemoryStore;
    use salvo::test::{ResponseExt, TestClient};

    const BASE: &str = "http://127.0.0.1:5800";

    #[handler]
    async fn dashboard(depot: &mut Depot) -> String {
        match depot.admin_session() {
            Some(session) => format!("Welcome, {}", session.subject),
            None => "no session".to_string(),
        }
    }

    fn service<S: SessionStore>(manager: &SessionManager<S>) -> Service {
        let router = Router::new()
            .push(Router::with_path("admin/logout").post(LogoutHandler::new(manager.clone())))
            .push(
                Router::with_path("admin/dashboard")
                    .hoop(RequireAdmin::new(manager.clone()))
                    .get(dashboard),
            );
        Service::new(router)
    }

    fn memory_manager(config: SessionConfig) -> SessionManager<MemoryStore> {
        SessionManager::new(MemoryStore::new(), config).unwrap()
    }

    async fn logout(service: &Service, cookie: Option<&str>) -> Response {
        let mut request = TestClient::post(format!("{}/admin/logout", BASE));
        if let Some(cookie) = cookie {
            request = request.add_header("cookie", format!("admin_session={}", cookie), true);
        }
        request.send(service).await
    }

    fn assert_logged_out(res: &Response) {
        assert_eq!(res.status_code, Some(StatusCode::SEE_OTHER));
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/admin/login")
        );

        let cookie = res.cookie("admin_session").expect("removal cookie");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[tokio::test]
    async fn test_logout_without_cookie() {
        let store = UnreachableStore::default();
        let manager = SessionManager::new(store.clone(), SessionConfig::default()).unwrap();

        let res = logout(&service(&manager), None).await;

        assert_logged_out(&res);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_logout_deletes_session() {
        let manager = memory_manager(SessionConfig::default());
        let session = manager.login("admin-1").await.unwrap();

        let res = logout(&service(&manager), Some(&session.token)).await;

        assert_logged_out(&res);
        assert!(manager.store().get(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_unknown_token_still_redirects() {
        let manager = memory_manager(SessionConfig::default());
        let res = logout(&service(&manager), Some("deadbeef")).await;
        assert_logged_out(&res);
    }

    #[tokio::test]
    async fn test_logout_with_unreachable_store() {
        let store = UnreachableStore::default();
        let manager = SessionManager::new(store.clone(), SessionConfig::default()).unwrap();

        let res = logout(&service(&manager), Some("deadbeef")).await;

        assert_logged_out(&res);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_logout_twice_is_harmless() {
        let manager = memory_manager(SessionConfig::default());
        let session = manager.login("admin-1").await.unwrap();
        let service = service(&manager);

        assert_logged_out(&logout(&service, Some(&session.token)).await);
        assert_logged_out(&logout(&service, Some(&session.token)).await);
        assert!(manager.store().get(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_logouts_same_token() {
        let manager = memory_manager(SessionConfig::default());
        let session = manager.login("admin-1").await.unwrap();
        let service = service(&manager);

        let (a, b) = tokio::join!(
            logout(&service, Some(&session.token)),
            logout(&service, Some(&session.token))
        );

        assert_logged_out(&a);
        assert_logged_out(&b);
        assert!(manager.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tampered_signed_cookie_skips_store() {
        let store = UnreachableStore::default();
        let config = SessionConfig::new().with_secret("s3cret");
        let manager = SessionManager::new(store.clone(), config).unwrap();

        let forged = cookie_signature::sign("deadbeef", "other-secret");
        let res = logout(&service(&manager), Some(&forged)).await;

        assert_logged_out(&res);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_signed_cookie_logout() {
        let manager = memory_manager(SessionConfig::new().with_secret("s3cret"));
        let mut login_res = Response::new();
        let session = start_session(&manager, "admin-1", &mut login_res).await.unwrap();
        let value = login_res.cookie("admin_session").unwrap().value().to_string();

        let res = logout(&service(&manager), Some(&value)).await;

        assert_logged_out(&res);
        assert!(manager.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_session_sets_cookie() {
        let manager = memory_manager(SessionConfig::new().with_max_age(600).with_secure(true));
        let mut res = Response::new();

        let session = start_session(&manager, "admin-1", &mut res).await.unwrap();

        let cookie = res.cookie("admin_session").unwrap();
        assert_eq!(cookie.value(), session.token);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::seconds(600)));
        assert!(manager.resolve(&session.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_guard_admits_then_rejects_after_logout() {
        let manager = memory_manager(SessionConfig::default());
        let session = manager.login("admin-1").await.unwrap();
        let service = service(&manager);
        let cookie = format!("admin_session={}", session.token);

        let mut res = TestClient::get(format!("{}/admin/dashboard", BASE))
            .add_header("cookie", cookie.clone(), true)
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await.unwrap(), "Welcome, admin-1");

        assert_logged_out(&logout(&service, Some(&session.token)).await);

        // The stale cookie no longer opens the dashboard
        let res = TestClient::get(format!("{}/admin/dashboard", BASE))
            .add_header("cookie", cookie, true)
            .send(&service)
            .await;
        assert_logged_out(&res);
    }

    #[tokio::test]
    async fn test_guard_keeps_cookie_when_store_unreachable() {
        let store = UnreachableStore::default();
        let manager = SessionManager::new(store.clone(), SessionConfig::default()).unwrap();

        let res = TestClient::get(format!("{}/admin/dashboard", BASE))
            .add_header("cookie", "admin_session=deadbeef", true)
            .send(&service(&manager))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SEE_OTHER));
        assert_eq!(
            res.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/admin/login")
        );
        assert!(res.cookie("admin_session").is_none());
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_guard_without_cookie() {
        let manager = memory_manager(SessionConfig::default());
        let res = TestClient::get(format!("{}/admin/dashboard", BASE))
            .send(&service(&manager))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SEE_OTHER));
        assert!(res.cookie("admin_session").is_none());
    }
}
