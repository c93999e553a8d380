//! # Booth Map Runtime
//!
//! Procedure registry and dispatch for the Booth Map API.
//!
//! ## Core Components
//!
//! - **Registry**: the static table of [`ProcedureDef`]s ([`PROCEDURES`])
//! - **`AppRouter`**: resolves a path, checks the call kind, runs tier guards,
//!   validates input and invokes the handler
//! - **Routers**: typed handlers for the `event` and `booth` namespaces
//! - **Metrics**: Prometheus recorders for calls, sessions and batches
//!
//! ## Example
//!
//! ```ignore
//! use boothmap_runtime::AppRouter;
//! use boothmap_core::{ProcedureKind, RequestContext};
//!
//! let router = AppRouter::new(store);
//! let events = router
//!     .call("event.getAll", ProcedureKind::Query, &RequestContext::anonymous(), None)
//!     .await?;
//! ```

use boothmap_core::error::{ProcedureError, Result, StoreError};
use boothmap_core::procedure::{ProcedureKind, RequestContext, Tier};
use boothmap_core::store::FloorPlanStore;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// `booth.*` procedures
pub mod booth;

/// `event.*` procedures
pub mod event;

/// Prometheus metrics for observability
pub mod metrics;

pub use booth::BoothRouter;
pub use event::EventRouter;

use crate::metrics::ProcedureMetrics;

/// Static description of one procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureDef {
    /// Dotted path (`"event.getAll"`).
    pub path: &'static str,
    /// Query or mutation.
    pub kind: ProcedureKind,
    /// Authorization tier.
    pub tier: Tier,
}

const fn procedure(path: &'static str, kind: ProcedureKind, tier: Tier) -> ProcedureDef {
    ProcedureDef { path, kind, tier }
}

/// Every procedure the API exposes.
pub const PROCEDURES: &[ProcedureDef] = &[
    procedure("event.getAll", ProcedureKind::Query, Tier::Public),
    procedure("event.getMy", ProcedureKind::Query, Tier::Organizer),
    procedure("event.getById", ProcedureKind::Query, Tier::Public),
    procedure("event.create", ProcedureKind::Mutation, Tier::Organizer),
    procedure("event.update", ProcedureKind::Mutation, Tier::Organizer),
    procedure("event.delete", ProcedureKind::Mutation, Tier::Organizer),
    procedure("booth.getByEventId", ProcedureKind::Query, Tier::Public),
    procedure("booth.create", ProcedureKind::Mutation, Tier::Organizer),
    procedure("booth.update", ProcedureKind::Mutation, Tier::Organizer),
    procedure("booth.delete", ProcedureKind::Mutation, Tier::Organizer),
    procedure("booth.updateMany", ProcedureKind::Mutation, Tier::Organizer),
];

/// Look up a procedure by path.
#[must_use]
pub fn lookup(path: &str) -> Option<&'static ProcedureDef> {
    PROCEDURES.iter().find(|def| def.path == path)
}

/// Serialize a handler result into the response payload.
pub(crate) fn respond<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        ProcedureError::Internal(StoreError::Database(format!(
            "failed to serialize response: {e}"
        )))
    })
}

/// Root router: the `event` and `booth` namespaces over one store.
pub struct AppRouter<S> {
    /// `event.*` handlers.
    pub event: EventRouter<S>,
    /// `booth.*` handlers.
    pub booth: BoothRouter<S>,
}

impl<S> Clone for AppRouter<S> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            booth: self.booth.clone(),
        }
    }
}

impl<S: FloorPlanStore> AppRouter<S> {
    /// Create a router that owns `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Create a router over a shared store.
    #[must_use]
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            event: EventRouter::new(Arc::clone(&store)),
            booth: BoothRouter::new(store),
        }
    }

    /// Invoke the procedure at `path`.
    ///
    /// Stages run in order and the first failure wins: lookup, kind check,
    /// tier guards, input validation, handler.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no procedure is registered at `path`
    /// - `MethodNotSupported` if `kind` does not match the procedure
    /// - `Unauthorized` / `Forbidden` from the tier guards
    /// - `BadRequest` if `input` fails validation
    /// - any error the handler returns
    #[tracing::instrument(
        skip(self, ctx, input),
        fields(correlation_id = %ctx.correlation_id),
        name = "procedure_call"
    )]
    pub async fn call(
        &self,
        path: &str,
        kind: ProcedureKind,
        ctx: &RequestContext,
        input: Option<Value>,
    ) -> Result<Value> {
        let start = Instant::now();
        let def = lookup(path);
        let result = match def {
            Some(def) => self.invoke(def, kind, ctx, input).await,
            None => Err(ProcedureError::not_found(format!(
                "No \"{kind}\"-procedure on path \"{path}\""
            ))),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind().code(),
        };
        ProcedureMetrics::record_call(def.map_or("unknown", |d| d.path), outcome, start.elapsed());

        match &result {
            Ok(_) => tracing::debug!(outcome, "Procedure completed"),
            Err(ProcedureError::Internal(source)) => {
                tracing::error!(error = %source, "Procedure failed");
            }
            Err(e) => tracing::debug!(outcome, error = %e, "Procedure rejected"),
        }
        result
    }

    async fn invoke(
        &self,
        def: &ProcedureDef,
        kind: ProcedureKind,
        ctx: &RequestContext,
        input: Option<Value>,
    ) -> Result<Value> {
        if def.kind != kind {
            return Err(ProcedureError::MethodNotSupported(format!(
                "Unsupported {kind} call on {} procedure \"{}\"",
                def.kind, def.path
            )));
        }

        let caller = def.tier.authorize(ctx)?;

        match def.path.split_once('.') {
            Some(("event", operation)) => self.event.dispatch(operation, caller, input).await,
            Some(("booth", operation)) => self.booth.dispatch(operation, caller, input).await,
            _ => Err(ProcedureError::not_found(format!(
                "No \"{kind}\"-procedure on path \"{}\"",
                def.path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_paths_are_unique() {
        let paths: HashSet<_> = PROCEDURES.iter().map(|d| d.path).collect();
        assert_eq!(paths.len(), PROCEDURES.len());
        assert_eq!(PROCEDURES.len(), 11);
    }

    #[test]
    fn only_reads_are_public() {
        for def in PROCEDURES {
            if def.tier == Tier::Public {
                assert_eq!(def.kind, ProcedureKind::Query, "{}", def.path);
            }
            if def.kind == ProcedureKind::Mutation {
                assert_eq!(def.tier, Tier::Organizer, "{}", def.path);
            }
        }
    }

    #[test]
    fn lookup_finds_registered_paths_only() {
        assert_eq!(
            lookup("booth.updateMany").map(|d| d.kind),
            Some(ProcedureKind::Mutation)
        );
        assert!(lookup("booth.move").is_none());
        assert!(lookup("").is_none());
    }
}
