//! Axum transport for the Booth Map procedure API.
//!
//! This crate is the imperative shell around [`boothmap_runtime::AppRouter`]:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Transport (Axum)                │  ← HTTP, JSON, cookies
//! │  - Query / body parsing                 │  ← Batching
//! │  - Session resolution (once/request)    │  ← Correlation IDs, tracing
//! │  - Envelope serialization               │
//! ├─────────────────────────────────────────┤
//! │         Procedures (runtime)            │
//! │  - Tier guards, input validation        │
//! │  - Event and booth handlers             │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use boothmap_web::{AppState, router};
//!
//! let state = AppState::new(AppRouter::new(store), resolver);
//! let app = router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{Router, routing::get};
use boothmap_core::session::SessionResolver;
use boothmap_core::store::FloorPlanStore;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdLayer, correlation_id_layer};
pub use state::AppState;

/// Build the HTTP router.
///
/// ```text
/// GET  /health
/// GET  /trpc/{path}
/// POST /trpc/{path}
/// ```
pub fn router<S, R>(state: AppState<S, R>) -> Router
where
    S: FloorPlanStore + 'static,
    R: SessionResolver + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/trpc/:path",
            get(handlers::rpc::query::<S, R>).post(handlers::rpc::mutation::<S, R>),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
}
