//! Procedure endpoints.
//!
//! # Endpoints
//!
//! ```text
//! GET  /trpc/{path}?input=<json>               query
//! POST /trpc/{path}              body: <json>  mutation
//! ```
//!
//! With `?batch=1` the path is a comma-separated list of procedures and the
//! input is an object keyed by call index:
//!
//! ```text
//! GET /trpc/event.getAll,event.getById?batch=1&input={"1":{"id":"..."}}
//! ```
//!
//! Batched calls run concurrently against one resolved session. The response
//! is an array of envelopes in call order, sent with the status every entry
//! agrees on, or `207 Multi-Status` when they differ.

use crate::error::{AppError, ErrorEnvelope};
use crate::extractors::CorrelationId;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use boothmap_core::error::{ProcedureError, StoreError};
use boothmap_core::procedure::{ProcedureKind, RequestContext};
use boothmap_core::session::{Session, SessionResolver};
use boothmap_core::store::FloorPlanStore;
use boothmap_runtime::AppRouter;
use boothmap_runtime::metrics::{BatchMetrics, SessionMetrics};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Query-string parameters accepted by both endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct RpcParams {
    /// `"1"` marks a batch request.
    pub batch: Option<String>,
    /// JSON-encoded input (queries only).
    pub input: Option<String>,
}

impl RpcParams {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1" | "true"))
    }
}

/// `GET /trpc/{path}`
pub async fn query<S, R>(
    State(state): State<AppState<S, R>>,
    Path(path): Path<String>,
    Query(params): Query<RpcParams>,
    CorrelationId(correlation_id): CorrelationId,
    headers: HeaderMap,
) -> Response
where
    S: FloorPlanStore + 'static,
    R: SessionResolver + 'static,
{
    let batch = params.is_batch();
    execute(
        &state,
        Request {
            kind: ProcedureKind::Query,
            path: &path,
            batch,
            raw_input: params.input.as_deref(),
            headers: &headers,
            correlation_id,
        },
    )
    .await
}

/// `POST /trpc/{path}`
pub async fn mutation<S, R>(
    State(state): State<AppState<S, R>>,
    Path(path): Path<String>,
    Query(params): Query<RpcParams>,
    CorrelationId(correlation_id): CorrelationId,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: FloorPlanStore + 'static,
    R: SessionResolver + 'static,
{
    let batch = params.is_batch();
    let Ok(raw_input) = std::str::from_utf8(&body) else {
        return AppError::parse("Request body is not valid UTF-8", (!batch).then_some(&*path))
            .into_response();
    };
    execute(
        &state,
        Request {
            kind: ProcedureKind::Mutation,
            path: &path,
            batch,
            raw_input: Some(raw_input),
            headers: &headers,
            correlation_id,
        },
    )
    .await
}

struct Request<'a> {
    kind: ProcedureKind,
    path: &'a str,
    batch: bool,
    raw_input: Option<&'a str>,
    headers: &'a HeaderMap,
    correlation_id: Uuid,
}

#[derive(Debug)]
struct Call<'a> {
    path: &'a str,
    input: Option<Value>,
}

async fn execute<S, R>(state: &AppState<S, R>, request: Request<'_>) -> Response
where
    S: FloorPlanStore,
    R: SessionResolver,
{
    let calls = match split_calls(request.path, request.batch, request.raw_input) {
        Ok(calls) => calls,
        Err(err) => return err.into_response(),
    };

    tracing::debug!(
        path = request.path,
        kind = %request.kind,
        batch = request.batch,
        calls = calls.len(),
        "Handling procedure request"
    );

    let ctx = resolve_session(&*state.sessions, request.headers)
        .await
        .map(|session| RequestContext::new(session, request.correlation_id));

    if !request.batch {
        let result = match calls.into_iter().next() {
            Some(call) => run(&state.router, request.kind, &ctx, call).await,
            None => Err(AppError::parse("Missing procedure call", Some(request.path))),
        };
        return match result {
            Ok(data) => (StatusCode::OK, Json(SuccessEnvelope::new(&data))).into_response(),
            Err(err) => err.into_response(),
        };
    }

    BatchMetrics::record_size(calls.len());
    let results = join_all(
        calls
            .into_iter()
            .map(|call| run(&state.router, request.kind, &ctx, call)),
    )
    .await;

    let status = batch_status(&results);
    let entries: Vec<Entry<'_>> = results
        .iter()
        .map(|result| match result {
            Ok(data) => Entry::Ok(SuccessEnvelope::new(data)),
            Err(err) => {
                err.log();
                Entry::Err(err.envelope())
            }
        })
        .collect();

    (status, Json(entries)).into_response()
}

/// Split a request into calls and their inputs.
fn split_calls<'a>(
    path: &'a str,
    batch: bool,
    raw_input: Option<&str>,
) -> Result<Vec<Call<'a>>, AppError> {
    let error_path = (!batch).then_some(path);
    let input = match raw_input.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(
            serde_json::from_str::<Value>(raw)
                .map_err(|e| AppError::parse(e.to_string(), error_path))?,
        ),
        None => None,
    };

    if !batch {
        return Ok(vec![Call { path, input }]);
    }

    let mut inputs = match input {
        None => serde_json::Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(AppError::from_procedure(
                ProcedureError::bad_request(
                    "",
                    "\"input\" needs to be an object when doing a batch call",
                ),
                None,
            ));
        }
    };

    Ok(path
        .split(',')
        .enumerate()
        .map(|(index, path)| Call {
            path,
            input: inputs.remove(&index.to_string()),
        })
        .collect())
}

async fn resolve_session<R: SessionResolver>(
    sessions: &R,
    headers: &HeaderMap,
) -> Result<Option<Session>, StoreError> {
    let resolved = sessions.resolve(headers).await;
    let outcome = match &resolved {
        Ok(Some(_)) => "authenticated",
        Ok(None) => "anonymous",
        Err(e) => {
            tracing::error!(error = %e, "Session resolution failed");
            "error"
        }
    };
    SessionMetrics::record_resolution(outcome);
    resolved
}

async fn run<S: FloorPlanStore>(
    router: &AppRouter<S>,
    kind: ProcedureKind,
    ctx: &Result<RequestContext, StoreError>,
    call: Call<'_>,
) -> Result<Value, AppError> {
    let ctx = ctx.as_ref().map_err(|e| {
        AppError::from_procedure(ProcedureError::Internal(e.clone()), Some(call.path))
    })?;
    router
        .call(call.path, kind, ctx, call.input)
        .await
        .map_err(|e| AppError::from_procedure(e, Some(call.path)))
}

fn batch_status(results: &[Result<Value, AppError>]) -> StatusCode {
    let mut statuses = results.iter().map(|result| match result {
        Ok(_) => StatusCode::OK,
        Err(err) => err.status(),
    });
    let Some(first) = statuses.next() else {
        return StatusCode::OK;
    };
    if statuses.all(|status| status == first) {
        first
    } else {
        StatusCode::MULTI_STATUS
    }
}

/// `{ "result": { "data": ... } }`
#[derive(Debug, Serialize)]
struct SuccessEnvelope<'a> {
    result: SuccessData<'a>,
}

#[derive(Debug, Serialize)]
struct SuccessData<'a> {
    data: &'a Value,
}

impl<'a> SuccessEnvelope<'a> {
    const fn new(data: &'a Value) -> Self {
        Self {
            result: SuccessData { data },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Entry<'a> {
    Ok(SuccessEnvelope<'a>),
    Err(ErrorEnvelope<'a>),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use boothmap_core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_single_call_without_input() {
        let calls = split_calls("event.getAll", false, None).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "event.getAll");
        assert!(calls[0].input.is_none());
    }

    #[test]
    fn test_blank_body_is_no_input() {
        let calls = split_calls("event.getMy", false, Some("  ")).unwrap();
        assert!(calls[0].input.is_none());
    }

    #[test]
    fn test_malformed_input_is_parse_error() {
        let err = split_calls("event.getById", false, Some("{\"id\":")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_batch_inputs_are_keyed_by_index() {
        let calls = split_calls(
            "event.getAll,event.getById,booth.getByEventId",
            true,
            Some(r#"{"1":{"id":"a"},"2":{"eventId":"b"}}"#),
        )
        .unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].input.is_none());
        assert_eq!(calls[1].input, Some(json!({"id": "a"})));
        assert_eq!(calls[2].path, "booth.getByEventId");
    }

    #[test]
    fn test_batch_input_must_be_an_object() {
        let err = split_calls("event.getAll", true, Some("[1]")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_batch_status() {
        let forbidden = || -> Result<Value, AppError> {
            Err(AppError::from_procedure(
                ProcedureError::forbidden("FORBIDDEN"),
                None,
            ))
        };
        assert_eq!(batch_status(&[Ok(json!(1)), Ok(json!(2))]), StatusCode::OK);
        assert_eq!(batch_status(&[forbidden(), forbidden()]), StatusCode::FORBIDDEN);
        assert_eq!(
            batch_status(&[Ok(json!(1)), forbidden()]),
            StatusCode::MULTI_STATUS
        );
        assert_eq!(batch_status(&[]), StatusCode::OK);
    }
}
