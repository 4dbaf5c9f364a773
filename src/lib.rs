//! # salvo-admin-session
//!
//! Admin session lifecycle for the Salvo web framework.
//!
//! Sessions are minted at login, resolved on every admin request and
//! deleted at logout. Deletion is terminal: a deleted token never resolves
//! again, and every login mints a fresh token. Logout always succeeds from
//! the user's point of view; a store failure is logged and the record is
//! left to expire.
//!
//! ## Features
//!
//! - **Pluggable storage backends**: Memory, Redis (`redis-store`, default)
//!   or Postgres (`postgres-store`)
//! - **Logout handler**: idempotent server-side delete, cookie removal and
//!   redirect to the login page
//! - **Guard middleware**: resolves the `admin_session` cookie for admin routes
//! - **Optional signed cookies** with secret rotation
//! - **Expiry sweeper** for stores without native TTL
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salvo::prelude::*;
//! use salvo_admin_session::{LogoutHandler, MemoryStore, RequireAdmin, SessionConfig, SessionManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SessionConfig::new().with_login_path("/admin/login");
//!     let manager = SessionManager::new(MemoryStore::new(), config).unwrap();
//!     manager.sweeper().spawn();
//!
//!     let router = Router::with_path("admin")
//!         .push(Router::with_path("logout").post(LogoutHandler::new(manager.clone())))
//!         .push(Router::with_path("posts").hoop(RequireAdmin::new(manager.clone())).get(posts));
//!
//!     Server::new(TcpListener::new("127.0.0.1:5800").bind().await)
//!         .serve(router)
//!         .await;
//! }
//! ```

pub mod config;
pub mod cookie_signature;
pub mod error;
pub mod handler;
pub mod manager;
pub mod session;
pub mod store;
pub mod sweeper;

pub use config::{SameSite, SessionConfig};
pub use error::SessionError;
pub use handler::{start_session, LogoutHandler, RequireAdmin};
pub use manager::{DeleteOutcome, SessionManager};
pub use session::AdminSession;
pub use store::{MemoryStore, Removal, SessionStore};
pub use sweeper::ExpirySweeper;

#[cfg(feature = "redis-store")]
pub use store::RedisStore;

#[cfg(feature = "postgres-store")]
pub use store::PostgresStore;

/// Extension trait for Depot to easily access the admin session
pub mod depot_ext;
pub use depot_ext::SessionDepotExt;
