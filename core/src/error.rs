//! Error taxonomy for procedure calls and the persistence gateway.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for procedure calls.
pub type Result<T> = std::result::Result<T, ProcedureError>;

/// Result type alias for persistence gateway operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Machine-readable error kind carried in every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Request input was not valid JSON.
    ParseError,
    /// Input failed shape or constraint validation.
    BadRequest,
    /// No session on a protected-or-higher procedure.
    Unauthorized,
    /// Session present but role or ownership insufficient.
    Forbidden,
    /// Referenced entity or procedure does not exist.
    NotFound,
    /// Procedure invoked with the wrong call kind.
    MethodNotSupported,
    /// Unexpected failure below the procedure layer.
    InternalServerError,
}

impl ErrorKind {
    /// Upper-case code string (`"FORBIDDEN"`, ...).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// HTTP status code for this kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::ParseError | Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotSupported => 405,
            Self::InternalServerError => 500,
        }
    }

    /// JSON-RPC 2.0 style numeric code.
    #[must_use]
    pub const fn json_rpc_code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::BadRequest => -32600,
            Self::Unauthorized => -32001,
            Self::Forbidden => -32003,
            Self::NotFound => -32004,
            Self::MethodNotSupported => -32005,
            Self::InternalServerError => -32603,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One failed input constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending field (empty for the root value).
    pub path: String,
    /// What was wrong with it.
    pub message: String,
}

/// Typed failure of a procedure call.
///
/// Every failure aborts the call; none are retried.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// Input was not valid JSON.
    #[error("{0}")]
    Parse(String),

    /// Input failed validation.
    #[error("{message}")]
    BadRequest {
        /// Summary message.
        message: String,
        /// Individual constraint failures.
        issues: Vec<ValidationIssue>,
    },

    /// Caller has no session.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller lacks the role or does not own the resource.
    #[error("{0}")]
    Forbidden(String),

    /// Entity or procedure does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Query invoked as mutation or vice versa.
    #[error("{0}")]
    MethodNotSupported(String),

    /// Persistence or session backend failure.
    #[error("Internal server error")]
    Internal(#[source] StoreError),
}

impl ProcedureError {
    /// The machine-readable kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::ParseError,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MethodNotSupported(_) => ErrorKind::MethodNotSupported,
            Self::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Validation issues, empty for every kind but `BadRequest`.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::BadRequest { issues, .. } => issues,
            _ => &[],
        }
    }

    /// Create an `Unauthorized` error with the default message.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized("UNAUTHORIZED".to_string())
    }

    /// Create a `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a `BadRequest` error with a single issue at `path`.
    #[must_use]
    pub fn bad_request(path: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::BadRequest {
            message: message.clone(),
            issues: vec![ValidationIssue {
                path: path.into(),
                message,
            }],
        }
    }

    /// Rewrite an ownership failure into `Forbidden` with `message`.
    ///
    /// Every other error passes through unchanged.
    #[must_use]
    pub fn ownership_message(self, message: &str) -> Self {
        match self {
            Self::Forbidden(_) => Self::Forbidden(message.to_string()),
            other => other,
        }
    }
}

impl From<garde::Report> for ProcedureError {
    fn from(report: garde::Report) -> Self {
        let issues: Vec<ValidationIssue> = report
            .iter()
            .map(|(path, error)| ValidationIssue {
                path: path.to_string(),
                message: error.to_string(),
            })
            .collect();

        let message = issues
            .iter()
            .map(|issue| {
                if issue.path.is_empty() {
                    issue.message.clone()
                } else {
                    format!("{}: {}", issue.path, issue.message)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::BadRequest { message, issues }
    }
}

impl From<serde_json::Error> for ProcedureError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request("", err.to_string())
    }
}

impl From<StoreError> for ProcedureError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotOwned => Self::Forbidden("FORBIDDEN".to_string()),
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Constraint(message) => Self::bad_request("", message),
            other @ StoreError::Database(_) => Self::Internal(other),
        }
    }
}

/// Failure reported by a [`FloorPlanStore`](crate::store::FloorPlanStore) or session backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The target row does not exist or is not owned by the caller.
    ///
    /// The two cases are deliberately indistinguishable to the caller.
    #[error("resource missing or not owned by caller")]
    NotOwned,

    /// A row referenced inside a batch does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A store constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Connection, query or decode failure.
    #[error("database error: {0}")]
    Database(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_http_and_rpc_codes() {
        assert_eq!(ErrorKind::Unauthorized.http_status(), 401);
        assert_eq!(ErrorKind::Forbidden.http_status(), 403);
        assert_eq!(ErrorKind::NotFound.json_rpc_code(), -32004);
        assert_eq!(ErrorKind::BadRequest.code(), "BAD_REQUEST");
    }

    #[test]
    fn store_errors_map_to_procedure_kinds() {
        assert_eq!(
            ProcedureError::from(StoreError::NotOwned).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            ProcedureError::from(StoreError::NotFound("x".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ProcedureError::from(StoreError::Constraint("x".into())).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            ProcedureError::from(StoreError::Database("x".into())).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn ownership_message_only_rewrites_forbidden() {
        let err = ProcedureError::from(StoreError::NotOwned)
            .ownership_message("You can only update your own events");
        assert_eq!(err.to_string(), "You can only update your own events");

        let err = ProcedureError::not_found("Event not found")
            .ownership_message("You can only update your own events");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn internal_errors_hide_the_cause_in_display() {
        let err = ProcedureError::from(StoreError::Database("password=hunter2".into()));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
