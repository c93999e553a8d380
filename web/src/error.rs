//! Error envelopes for procedure responses.
//!
//! Every failed call is rendered as:
//!
//! ```json
//! {
//!   "error": {
//!     "message": "You can only update your own events",
//!     "code": -32003,
//!     "data": { "code": "FORBIDDEN", "httpStatus": 403, "path": "event.update" }
//!   }
//! }
//! ```
//!
//! `data.issues` is present only for `BAD_REQUEST` errors raised by input
//! validation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use boothmap_core::error::{ErrorKind, ProcedureError, StoreError, ValidationIssue};
use serde::Serialize;
use std::fmt;

/// A failed procedure call, ready to be rendered.
///
/// Internal failures keep their cause for logging; the client only ever sees
/// the generic message.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    path: Option<String>,
    issues: Vec<ValidationIssue>,
    source: Option<StoreError>,
}

impl AppError {
    /// Wrap a procedure error raised while calling `path`.
    #[must_use]
    pub fn from_procedure(err: ProcedureError, path: Option<&str>) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let issues = err.issues().to_vec();
        let source = match err {
            ProcedureError::Internal(source) => Some(source),
            _ => None,
        };
        Self {
            kind,
            message,
            path: path.map(str::to_string),
            issues,
            source,
        }
    }

    /// Malformed `input` JSON.
    #[must_use]
    pub fn parse(message: impl Into<String>, path: Option<&str>) -> Self {
        Self::from_procedure(ProcedureError::Parse(message.into()), path)
    }

    /// The error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Log server-side failures with their cause.
    pub(crate) fn log(&self) {
        if self.status().is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    code = %self.kind,
                    path = self.path.as_deref().unwrap_or(""),
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    code = %self.kind,
                    path = self.path.as_deref().unwrap_or(""),
                    "Internal server error"
                ),
            }
        }
    }

    /// The serializable envelope.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope<'_> {
        ErrorEnvelope {
            error: ErrorShape {
                message: &self.message,
                code: self.kind.json_rpc_code(),
                data: ErrorData {
                    code: self.kind,
                    http_status: self.kind.http_status(),
                    path: self.path.as_deref(),
                    issues: (!self.issues.is_empty()).then_some(self.issues.as_slice()),
                },
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// `{ "error": ... }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    error: ErrorShape<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorShape<'a> {
    message: &'a str,
    code: i32,
    data: ErrorData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorData<'a> {
    code: ErrorKind,
    http_status: u16,
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [ValidationIssue]>,
}
