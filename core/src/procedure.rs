//! Procedure kinds, authorization tiers and guards.
//!
//! Each procedure declares exactly one [`Tier`]. A tier is an ordered list of
//! [`Guard`]s, each a superset of the previous tier's list:
//!
//! ```text
//! Public     → []
//! Protected  → [RequireSession]
//! Organizer  → [RequireSession, RequireRole(ORGANIZER)]
//! ```
//!
//! Guards read an immutable [`RequestContext`]; nothing in the chain mutates
//! it. A successful [`Tier::authorize`] yields a [`Caller`] the handler reads
//! the user from.

use crate::error::ProcedureError;
use crate::session::{Session, SessionUser};
use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Read or write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    /// Side-effect free read.
    Query,
    /// Write.
    Mutation,
}

impl ProcedureKind {
    /// Lower-case name (`"query"` / `"mutation"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call request context, built once by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Resolved session, if any.
    pub session: Option<Session>,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl RequestContext {
    /// Create a context.
    #[must_use]
    pub const fn new(session: Option<Session>, correlation_id: Uuid) -> Self {
        Self {
            session,
            correlation_id,
        }
    }

    /// Context without a session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None, Uuid::new_v4())
    }

    /// Context with `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self::new(Some(session), Uuid::new_v4())
    }

    /// The session user, if a session is present.
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// One authorization predicate.
pub trait Guard: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Check `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the error that short-circuits the call.
    fn check(&self, ctx: &RequestContext) -> Result<(), ProcedureError>;
}

/// Requires a session with a user.
#[derive(Debug, Clone, Copy)]
pub struct RequireSession;

impl Guard for RequireSession {
    fn name(&self) -> &'static str {
        "require_session"
    }

    fn check(&self, ctx: &RequestContext) -> Result<(), ProcedureError> {
        match ctx.user() {
            Some(_) => Ok(()),
            None => Err(ProcedureError::unauthorized()),
        }
    }
}

/// Requires the session user to hold a role.
///
/// Must run after [`RequireSession`].
#[derive(Debug, Clone, Copy)]
pub struct RequireRole(pub Role);

impl Guard for RequireRole {
    fn name(&self) -> &'static str {
        "require_role"
    }

    fn check(&self, ctx: &RequestContext) -> Result<(), ProcedureError> {
        match ctx.user() {
            Some(user) if user.role == self.0 => Ok(()),
            Some(_) => Err(ProcedureError::forbidden("FORBIDDEN")),
            None => Err(ProcedureError::unauthorized()),
        }
    }
}

const PUBLIC_GUARDS: &[&dyn Guard] = &[];
const PROTECTED_GUARDS: &[&dyn Guard] = &[&RequireSession];
const ORGANIZER_GUARDS: &[&dyn Guard] = &[&RequireSession, &RequireRole(Role::Organizer)];

/// Authorization tier a procedure is declared at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// No session requirement.
    Public,
    /// Requires a session.
    Protected,
    /// Requires a session with the organizer role.
    Organizer,
}

impl Tier {
    /// Guards in evaluation order.
    #[must_use]
    pub fn guards(self) -> &'static [&'static dyn Guard] {
        match self {
            Self::Public => PUBLIC_GUARDS,
            Self::Protected => PROTECTED_GUARDS,
            Self::Organizer => ORGANIZER_GUARDS,
        }
    }

    /// Run this tier's guards, outermost first.
    ///
    /// # Errors
    ///
    /// Returns the first guard failure.
    pub fn authorize(self, ctx: &RequestContext) -> Result<Caller<'_>, ProcedureError> {
        for guard in self.guards() {
            guard.check(ctx)?;
        }
        Ok(Caller {
            user: ctx.user(),
            correlation_id: ctx.correlation_id,
        })
    }
}

/// Output of a successful [`Tier::authorize`].
#[derive(Debug, Clone, Copy)]
pub struct Caller<'a> {
    user: Option<&'a SessionUser>,
    correlation_id: Uuid,
}

impl<'a> Caller<'a> {
    /// The session user, if present.
    #[must_use]
    pub const fn session_user(&self) -> Option<&'a SessionUser> {
        self.user
    }

    /// The session user on a protected-or-higher procedure.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the caller is anonymous.
    pub fn user(&self) -> Result<&'a SessionUser, ProcedureError> {
        self.user.ok_or_else(ProcedureError::unauthorized)
    }

    /// Correlation ID of the enclosing request.
    #[must_use]
    pub const fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
