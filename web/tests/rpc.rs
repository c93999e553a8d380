//! HTTP transport tests.
//!
//! Drive the full axum stack over the in-memory store and the mock session
//! store: envelopes, status codes, batching, sessions and correlation IDs.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use boothmap_auth::mocks::MockSessionStore;
use boothmap_auth::{StoredSession, TokenSessionResolver};
use boothmap_core::environment::Clock;
use boothmap_core::model::User;
use boothmap_runtime::AppRouter;
use boothmap_testing::{FixedClock, InMemoryFloorPlanStore, fixtures, test_clock};
use boothmap_web::{AppState, CORRELATION_ID_HEADER, router};
use chrono::Duration;
use serde_json::{Value, json};

type Resolver = TokenSessionResolver<MockSessionStore, FixedClock>;

struct Harness {
    server: TestServer,
    sessions: MockSessionStore,
}

const ALICE_TOKEN: &str = "tok-alice";
const BOB_TOKEN: &str = "tok-bob";
const VERA_TOKEN: &str = "tok-vera";

impl Harness {
    fn new() -> Self {
        let store = InMemoryFloorPlanStore::new();
        let sessions = MockSessionStore::new();
        for (token, user) in [
            (ALICE_TOKEN, store.add_user(fixtures::organizer("alice"))),
            (BOB_TOKEN, store.add_user(fixtures::organizer("bob"))),
            (VERA_TOKEN, store.add_user(fixtures::viewer("vera"))),
        ] {
            sessions.insert(stored(token, &user)).unwrap();
        }

        let resolver: Resolver = TokenSessionResolver::with_clock(sessions.clone(), test_clock());
        let state = AppState::new(AppRouter::new(store), resolver);
        let server = TestServer::new(router(state)).unwrap();
        Self { server, sessions }
    }

    async fn create_event(&self, token: &str, name: &str) -> String {
        let response = self
            .server
            .post("/trpc/event.create")
            .add_header(cookie_name(), cookie(token))
            .json(&json!({ "name": name }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json::<Value>()["result"]["data"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

fn stored(token: &str, user: &User) -> StoredSession {
    StoredSession {
        session_token: token.to_string(),
        user: fixtures::session_for(user).user,
        expires: test_clock().now() + Duration::hours(1),
    }
}

fn cookie_name() -> HeaderName {
    HeaderName::from_static("cookie")
}

fn cookie(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("boothmap.session-token={token}")).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let harness = Harness::new();

    let response = harness.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn public_query_returns_success_envelope() {
    let harness = Harness::new();

    let response = harness.server.get("/trpc/event.getAll").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "result": { "data": [] } }));
}

#[tokio::test]
async fn anonymous_mutation_is_unauthorized() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/trpc/event.create")
        .json(&json!({ "name": "Spring Fair" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "error": {
                "message": "UNAUTHORIZED",
                "code": -32001,
                "data": { "code": "UNAUTHORIZED", "httpStatus": 401, "path": "event.create" }
            }
        })
    );
}

#[tokio::test]
async fn viewer_mutation_is_forbidden() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/trpc/event.create")
        .add_header(cookie_name(), cookie(VERA_TOKEN))
        .json(&json!({ "name": "Spring Fair" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn created_event_is_readable_by_id() {
    let harness = Harness::new();
    let id = harness.create_event(ALICE_TOKEN, "Spring Fair").await;

    let response = harness
        .server
        .get("/trpc/event.getById")
        .add_query_param("input", json!({ "id": id }).to_string())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let data = &response.json::<Value>()["result"]["data"];
    assert_eq!(data["name"], "Spring Fair");
    assert_eq!(data["creator"]["username"], "alice");
    assert_eq!(data["booths"], json!([]));
}

#[tokio::test]
async fn bearer_token_authenticates() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/trpc/event.create")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {ALICE_TOKEN}")).unwrap(),
        )
        .json(&json!({ "name": "Spring Fair" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn non_owner_update_reports_ownership_message() {
    let harness = Harness::new();
    let id = harness.create_event(ALICE_TOKEN, "Spring Fair").await;

    let response = harness
        .server
        .post("/trpc/event.update")
        .add_header(cookie_name(), cookie(BOB_TOKEN))
        .json(&json!({ "id": id, "name": "Hijacked" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["message"], "You can only update your own events");
    assert_eq!(body["error"]["code"], -32003);
}

#[tokio::test]
async fn invalid_input_lists_issues() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/trpc/event.create")
        .add_header(cookie_name(), cookie(ALICE_TOKEN))
        .json(&json!({ "name": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let data = &response.json::<Value>()["error"]["data"];
    assert_eq!(data["code"], "BAD_REQUEST");
    assert_eq!(data["issues"][0]["path"], "name");
}

#[tokio::test]
async fn malformed_input_is_parse_error() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/trpc/event.getById")
        .add_query_param("input", "{\"id\":")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["error"]["data"]["code"], "PARSE_ERROR");
}

#[tokio::test]
async fn wrong_method_is_not_supported() {
    let harness = Harness::new();

    let response = harness.server.post("/trpc/event.getAll").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);

    let response = harness.server.get("/trpc/event.create").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.json::<Value>()["error"]["data"]["code"],
        "METHOD_NOT_SUPPORTED"
    );
}

#[tokio::test]
async fn unknown_procedure_is_not_found() {
    let harness = Harness::new();

    let response = harness.server.get("/trpc/event.archive").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "No \"query\"-procedure on path \"event.archive\""
    );
}

#[tokio::test]
async fn batch_with_mixed_outcomes_is_multi_status() {
    let harness = Harness::new();
    let id = harness.create_event(ALICE_TOKEN, "Spring Fair").await;

    let response = harness
        .server
        .get("/trpc/event.getById,event.getMy")
        .add_query_param("batch", "1")
        .add_query_param("input", json!({ "0": { "id": id } }).to_string())
        .await;

    assert_eq!(response.status_code(), StatusCode::MULTI_STATUS);
    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["result"]["data"]["name"], "Spring Fair");
    assert_eq!(entries[1]["error"]["data"]["code"], "UNAUTHORIZED");
    assert_eq!(entries[1]["error"]["data"]["path"], "event.getMy");
}

#[tokio::test]
async fn batch_with_uniform_outcomes_uses_common_status() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/trpc/event.create,event.create")
        .add_query_param("batch", "1")
        .add_header(cookie_name(), cookie(ALICE_TOKEN))
        .json(&json!({ "0": { "name": "Spring Fair" }, "1": { "name": "Summer Fair" } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries[0]["result"]["data"]["name"], "Spring Fair");
    assert_eq!(entries[1]["result"]["data"]["name"], "Summer Fair");

    let listed = harness.server.get("/trpc/event.getAll").await;
    assert_eq!(
        listed.json::<Value>()["result"]["data"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn batch_input_must_be_an_object() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/trpc/event.getAll")
        .add_query_param("batch", "1")
        .add_query_param("input", "[1]")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn correlation_id_is_echoed_or_generated() {
    let harness = Harness::new();
    let supplied = "5f0c6a3e-4d5b-4a8e-9b1e-2f6c3d7a8b90";

    let response = harness
        .server
        .get("/trpc/event.getAll")
        .add_header(
            HeaderName::from_static("x-correlation-id"),
            HeaderValue::from_static(supplied),
        )
        .await;
    assert_eq!(
        response.headers().get(CORRELATION_ID_HEADER).unwrap(),
        supplied
    );

    let response = harness.server.get("/trpc/event.getAll").await;
    let generated = response.headers().get(CORRELATION_ID_HEADER).unwrap();
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn session_backend_failure_is_internal_error() {
    let harness = Harness::new();
    harness.sessions.set_unavailable(true);

    let response = harness
        .server
        .get("/trpc/event.getMy")
        .add_header(cookie_name(), cookie(ALICE_TOKEN))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["message"], "Internal server error");
    assert_eq!(body["error"]["code"], -32603);
}

#[tokio::test]
async fn non_uuid_event_id_is_not_found() {
    let harness = Harness::new();

    let response = harness
        .server
        .get("/trpc/event.getById")
        .add_query_param("input", json!({ "id": "clx0abc" }).to_string())
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Event not found"
    );
}

#[tokio::test]
async fn explicit_null_description_is_rejected() {
    let harness = Harness::new();

    let response = harness
        .server
        .post("/trpc/event.create")
        .add_header(cookie_name(), cookie(ALICE_TOKEN))
        .json(&json!({ "name": "Spring Fair", "description": null }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["data"]["code"],
        "BAD_REQUEST"
    );
}
