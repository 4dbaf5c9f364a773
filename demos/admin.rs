//! Admin login/logout example using the in-memory session store

use salvo::prelude::*;
use salvo_admin_session::{
    start_session, LogoutHandler, MemoryStore, RequireAdmin, SessionConfig, SessionDepotExt,
    SessionManager,
};

#[handler]
async fn login_page() -> &'static str {
    "POST /admin/login?user=<name> to sign in"
}

/// Demo login: trusts the `user` query parameter
struct Login {
    manager: SessionManager<MemoryStore>,
}

#[async_trait]
impl Handler for Login {
    async fn handle(&self, req: &mut Request, _depot: &mut Depot, res: &mut Response, _ctrl: &mut FlowCtrl) {
        let user = req.query::<String>("user").unwrap_or_else(|| "admin".to_string());

        match start_session(&self.manager, &user, res).await {
            Ok(_) => res.render(Redirect::found("/admin/dashboard")),
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            }
        }
    }
}

#[handler]
async fn dashboard(depot: &mut Depot) -> String {
    match depot.admin_session() {
        Some(session) => format!(
            "Logged in as: {}\nSession expires at: {}",
            session.subject, session.expires_at
        ),
        None => "Not logged in".to_string(),
    }
}

#[tokio::main]
async fn main() {
    // Set up logging
    tracing_subscriber::fmt::init();

    let config = SessionConfig::new()
        .with_secret("your-super-secret-key-change-in-production")
        .with_max_age(3600) // 1 hour
        .with_login_path("/admin/login");

    let manager = match SessionManager::new(MemoryStore::from_config(&config), config) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Invalid session config: {}", e);
            return;
        }
    };

    // Reclaim expired sessions in the background
    let _sweeper = manager.sweeper().spawn();

    let router = Router::with_path("admin")
        .push(
            Router::with_path("login")
                .get(login_page)
                .post(Login { manager: manager.clone() }),
        )
        .push(Router::with_path("logout").post(LogoutHandler::new(manager.clone())))
        .push(
            Router::with_path("dashboard")
                .hoop(RequireAdmin::new(manager.clone()))
                .get(dashboard),
        );

    let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
    println!("Server running at http://127.0.0.1:5800");
    println!("Try these endpoints:");
    println!("  POST /admin/login?user=alice - Start a session");
    println!("  GET  /admin/dashboard        - Guarded page");
    println!("  POST /admin/logout           - End the session");

    Server::new(acceptor).serve(router).await;
}
