//! Extension trait for Depot to read the resolved admin session

use salvo_core::Depot;

use crate::session::AdminSession;

pub(crate) const SESSION_KEY: &str = "salvo.admin.session";

/// Extension trait for Salvo's Depot
///
/// The session is present only behind [`RequireAdmin`](crate::RequireAdmin).
pub trait SessionDepotExt {
    /// Get the active admin session
    fn admin_session(&self) -> Option<&AdminSession>;
}

impl SessionDepotExt for Depot {
    fn admin_session(&self) -> Option<&AdminSession> {
        self.get::<AdminSession>(SESSION_KEY).ok()
    }
}
