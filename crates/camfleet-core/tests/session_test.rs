#![allow(clippy::unwrap_used)]
// Integration tests for SessionGuard and NavigationGuard using wiremock.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use camfleet_api::{ApiClient, TokenStore};
use camfleet_core::{NavDecision, NavigationGuard, Role, Route, SessionGuard};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SessionGuard, Arc<TokenStore>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let tokens = Arc::new(TokenStore::in_memory());
    let api = ApiClient::with_client(reqwest::Client::new(), base_url, Arc::clone(&tokens));
    (server, SessionGuard::new(api), tokens)
}

fn devices_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([]))
}

// ── check_auth ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_check_auth_without_token_makes_no_network_call() {
    let (server, session, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(0)
        .mount(&server)
        .await;

    assert!(!session.check_auth().await);
    assert!(!session.is_authenticated().await);
    // No token at all is a *known* unauthenticated state.
    assert!(session.has_checked_auth().await);
}

#[tokio::test]
async fn test_check_auth_validates_existing_token() {
    let (server, session, tokens) = setup().await;
    tokens.set("abc");

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(1)
        .mount(&server)
        .await;

    assert!(!session.has_checked_auth().await);
    assert!(session.check_auth().await);
    assert!(session.is_authenticated().await);
    assert_eq!(session.current_user().await.map(|u| u.role), Some(Role::Admin));
    assert!(session.has_checked_auth().await);
}

#[tokio::test]
async fn test_check_auth_on_401_clears_the_token() {
    let (server, session, tokens) = setup().await;
    tokens.set("stale");

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!session.check_auth().await);
    assert!(!session.is_authenticated().await);
    assert_eq!(tokens.get(), None);
}

#[tokio::test]
async fn test_check_auth_keeps_token_on_transient_failure() {
    let (server, session, tokens) = setup().await;
    tokens.set("abc");

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!session.check_auth().await);
    assert!(!session.is_authenticated().await);
    // A 503 says nothing about the token; it survives for a later retry.
    assert_eq!(tokens.get(), Some("abc".to_owned()));
}

// ── login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_persists_token_and_validates() {
    let (server, session, tokens) = setup().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The automatic follow-up validation.
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(1)
        .mount(&server)
        .await;

    let password: secrecy::SecretString = "correct".to_string().into();
    let outcome = session.login("admin", &password).await;

    assert!(outcome.success);
    assert_eq!(tokens.get(), Some("abc".to_owned()));
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_login_rejection_surfaces_detail_and_stores_nothing() {
    let (server, session, tokens) = setup().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad credentials"})))
        .mount(&server)
        .await;

    let password: secrecy::SecretString = "wrong".to_string().into();
    let outcome = session.login("admin", &password).await;

    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("bad credentials"));
    assert_eq!(tokens.get(), None);
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_login_rejection_without_detail_uses_default_message() {
    let (server, session, _tokens) = setup().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let password: secrecy::SecretString = "pw".to_string().into();
    let outcome = session.login("admin", &password).await;

    assert!(!outcome.success);
    assert!(outcome.message.is_some());
}

#[tokio::test]
async fn test_reads_are_not_blocked_by_a_slow_token_exchange() {
    let (server, session, _tokens) = setup().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "abc", "token_type": "bearer"}))
                .set_delay(std::time::Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .mount(&server)
        .await;

    let login = tokio::spawn({
        let session = session.clone();
        async move {
            let password: secrecy::SecretString = "pw".to_string().into();
            session.login("admin", &password).await
        }
    });

    // While the exchange is still in flight, derived reads must answer
    // promptly instead of queueing behind it.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let read = tokio::time::timeout(
        std::time::Duration::from_millis(100),
        session.is_authenticated(),
    )
    .await;
    assert_eq!(read.ok(), Some(false));

    let outcome = login.await.unwrap();
    assert!(outcome.success);
    assert!(session.is_authenticated().await);
}

// ── health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_without_touching_the_session() {
    let (server, session, _tokens) = setup().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "timestamp": "2024-06-15T10:30:00",
            "database": "connected"
        })))
        .mount(&server)
        .await;

    let health = session.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.database.as_deref(), Some("connected"));

    // A liveness probe is not an auth check.
    assert!(!session.is_authenticated().await);
    assert!(session.has_checked_auth().await);
}

// ── logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (server, session, tokens) = setup().await;
    tokens.set("abc");

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .mount(&server)
        .await;

    assert!(session.check_auth().await);

    session.logout().await;
    session.logout().await;

    assert!(!session.is_authenticated().await);
    assert_eq!(session.current_user().await, None);
    assert_eq!(tokens.get(), None);
}

// ── Navigation guard ────────────────────────────────────────────────

#[tokio::test]
async fn test_nav_guard_allows_login_and_public_routes_without_checks() {
    let (server, session, _tokens) = setup().await;
    let guard = NavigationGuard::new(session);

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(guard.resolve(&Route::public("/login")).await, NavDecision::Allow);
    assert_eq!(guard.resolve(&Route::public("/monitor")).await, NavDecision::Allow);
}

#[tokio::test]
async fn test_nav_guard_denies_protected_route_without_token_and_without_probe() {
    let (server, session, _tokens) = setup().await;
    let guard = NavigationGuard::new(session);

    // No token: the redirect must happen without spending a round-trip.
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(
        guard.resolve(&Route::protected("/devices")).await,
        NavDecision::Redirect {
            to: "/login".to_owned()
        }
    );
}

#[tokio::test]
async fn test_nav_guard_validates_unverified_token_once() {
    let (server, session, tokens) = setup().await;
    tokens.set("abc");
    let guard = NavigationGuard::new(session);

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(1)
        .mount(&server)
        .await;

    // First transition pays the validation round-trip...
    assert_eq!(guard.resolve(&Route::protected("/devices")).await, NavDecision::Allow);
    // ...subsequent ones ride on the validated session (expect(1) above).
    assert_eq!(guard.resolve(&Route::protected("/settings")).await, NavDecision::Allow);
}

#[tokio::test]
async fn test_nav_guard_redirects_when_token_is_rejected() {
    let (server, session, tokens) = setup().await;
    tokens.set("stale");
    let guard = NavigationGuard::new(session);

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert_eq!(
        guard.resolve(&Route::protected("/devices")).await,
        NavDecision::Redirect {
            to: "/login".to_owned()
        }
    );
    assert_eq!(tokens.get(), None);
}

#[tokio::test]
async fn test_nav_guard_resolve_path_treats_unknown_routes_as_public() {
    let (server, session, _tokens) = setup().await;
    let guard = NavigationGuard::new(session);

    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(devices_ok())
        .expect(0)
        .mount(&server)
        .await;

    let table = camfleet_core::RouteTable::new()
        .with_route(Route::public("/login"))
        .with_route(Route::protected("/devices"));

    assert_eq!(guard.resolve_path(&table, "/nowhere").await, NavDecision::Allow);
    assert_eq!(
        guard.resolve_path(&table, "/devices").await,
        NavDecision::Redirect {
            to: "/login".to_owned()
        }
    );
}
