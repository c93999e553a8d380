//! Application state for Axum handlers.

use boothmap_runtime::AppRouter;
use std::sync::Arc;

/// State shared across all HTTP handlers.
///
/// `S` is the persistence gateway behind the procedure router and `R` the
/// session resolver the transport consults once per request.
pub struct AppState<S, R> {
    /// Procedure router.
    pub router: Arc<AppRouter<S>>,
    /// Session resolver.
    pub sessions: Arc<R>,
}

impl<S, R> AppState<S, R> {
    /// Create application state.
    #[must_use]
    pub fn new(router: AppRouter<S>, sessions: R) -> Self {
        Self {
            router: Arc::new(router),
            sessions: Arc::new(sessions),
        }
    }
}

impl<S, R> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            sessions: Arc::clone(&self.sessions),
        }
    }
}
