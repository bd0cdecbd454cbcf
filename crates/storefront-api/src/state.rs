//! Shared application state.

use storefront_enduser::application::services::EnduserServices;
use storefront_enduser::application::session_reconciliation::SessionReconciler;

use crate::cookies::CookieSettings;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Use-case dependencies of the end-user context.
    pub services: EnduserServices,
    /// Resolves and renews the session records named by request cookies.
    pub sessions: SessionReconciler,
    /// Attributes of the cookies this server sets.
    pub cookies: CookieSettings,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(services: EnduserServices, cookies: CookieSettings) -> Self {
        let sessions = SessionReconciler::new(
            services.session_accounts.clone(),
            services.session_carts.clone(),
            services.clock.clone(),
        );
        Self {
            services,
            sessions,
            cookies,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("services", &self.services)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}
