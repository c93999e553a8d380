//! Session resolution integration tests.
//!
//! Verifies the resolver's contract:
//!
//! - Missing or unknown tokens resolve to anonymous, never an error
//! - Expired sessions resolve to anonymous
//! - Backend failures surface as errors

#![allow(clippy::unwrap_used, clippy::expect_used)]

use boothmap_auth::mocks::MockSessionStore;
use boothmap_auth::{StoredSession, TokenSessionResolver};
use boothmap_core::error::StoreError;
use boothmap_core::session::{SessionResolver, SessionUser};
use boothmap_core::types::{Role, UserId};
use boothmap_testing::test_clock;
use boothmap_core::environment::Clock;
use chrono::Duration;
use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderValue};

fn organizer() -> SessionUser {
    SessionUser {
        id: UserId::new(),
        username: "alice".to_string(),
        role: Role::Organizer,
    }
}

fn cookie(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("boothmap.session-token={token}")).unwrap(),
    );
    headers
}

fn resolver_with(
    sessions: &[(&str, Duration)],
) -> (TokenSessionResolver<MockSessionStore, boothmap_testing::FixedClock>, SessionUser) {
    let clock = test_clock();
    let store = MockSessionStore::new();
    let user = organizer();
    for (token, ttl) in sessions {
        store
            .insert(StoredSession {
                session_token: (*token).to_string(),
                user: user.clone(),
                expires: clock.now() + *ttl,
            })
            .unwrap();
    }
    (TokenSessionResolver::with_clock(store, clock), user)
}

#[tokio::test]
async fn valid_cookie_resolves_to_the_stored_user() {
    let (resolver, user) = resolver_with(&[("tok-valid", Duration::hours(1))]);

    let session = resolver.resolve(&cookie("tok-valid")).await.unwrap().unwrap();
    assert_eq!(session.user, user);
    assert_eq!(session.expires, test_clock().now() + Duration::hours(1));
}

#[tokio::test]
async fn bearer_token_resolves_when_no_cookie_is_sent() {
    let (resolver, user) = resolver_with(&[("tok-valid", Duration::hours(1))]);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-valid"));

    let session = resolver.resolve(&headers).await.unwrap().unwrap();
    assert_eq!(session.user.id, user.id);
}

#[tokio::test]
async fn missing_and_unknown_tokens_are_anonymous() {
    let (resolver, _) = resolver_with(&[("tok-valid", Duration::hours(1))]);

    assert!(resolver.resolve(&HeaderMap::new()).await.unwrap().is_none());
    assert!(resolver.resolve(&cookie("tok-unknown")).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_is_anonymous() {
    let (resolver, _) = resolver_with(&[
        ("tok-expired", -Duration::minutes(5)),
        ("tok-boundary", Duration::zero()),
    ]);

    assert!(resolver.resolve(&cookie("tok-expired")).await.unwrap().is_none());
    // expiry equal to now counts as expired
    assert!(resolver.resolve(&cookie("tok-boundary")).await.unwrap().is_none());
}

#[tokio::test]
async fn revoked_session_is_anonymous() {
    let (resolver, _) = resolver_with(&[("tok-valid", Duration::hours(1))]);
    assert!(resolver.store().revoke("tok-valid").unwrap());

    assert!(resolver.resolve(&cookie("tok-valid")).await.unwrap().is_none());
}

#[tokio::test]
async fn backend_failure_is_an_error() {
    let (resolver, _) = resolver_with(&[("tok-valid", Duration::hours(1))]);
    resolver.store().set_unavailable(true);

    let err = resolver.resolve(&cookie("tok-valid")).await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));

    // anonymous requests never touch the backend
    assert!(resolver.resolve(&HeaderMap::new()).await.unwrap().is_none());
}
