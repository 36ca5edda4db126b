use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use guildhall::GuildhallStorage;
use guildhall::auth;
use guildhall::router::{GuildhallState, guildhall_router};
use serde_json::Value;
use tower::ServiceExt;

async fn temp_storage(tag: &str) -> (GuildhallStorage, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "guildhall-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let storage = GuildhallStorage::connect(&database_url)
        .await
        .expect("failed to open test database");
    storage
        .init_schema()
        .await
        .expect("failed to initialize schema");
    (storage, temp_path)
}

async fn json_body(resp: axum::response::Response) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not JSON")
}

#[tokio::test]
async fn landing_returns_members_and_events() {
    let (storage, temp_path) = temp_storage("route-landing").await;

    let alice = storage
        .upsert_member("d1", "Alice")
        .await
        .expect("upsert failed");
    storage
        .insert_screenshot(&alice.id, "https://img.example/a1.png")
        .await
        .expect("screenshot failed");
    storage
        .upsert_member("d2", "Bob")
        .await
        .expect("upsert failed");
    storage
        .upsert_event("e1", "Game night", None, Utc::now() + Duration::days(3), None)
        .await
        .expect("event failed");

    let app = guildhall_router(GuildhallState::new(storage.clone()));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;

    let members = body["publishedMembers"]
        .as_array()
        .expect("publishedMembers missing");
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["member"]["discordId"], "d1");
    assert_eq!(
        members[0]["screenshots"][0]["url"],
        "https://img.example/a1.png"
    );
    assert_eq!(members[1]["member"]["name"], "Bob");
    assert_eq!(
        members[1]["screenshots"]
            .as_array()
            .expect("screenshots missing")
            .len(),
        0
    );

    let events = body["scheduledEvents"]
        .as_array()
        .expect("scheduledEvents missing");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Game night");

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn player_page_serves_member_profile() {
    let (storage, temp_path) = temp_storage("route-player").await;

    let alice = storage
        .upsert_member("d1", "Alice")
        .await
        .expect("upsert failed");
    storage
        .insert_screenshot(&alice.id, "https://img.example/one.png")
        .await
        .expect("screenshot failed");
    storage
        .insert_screenshot(&alice.id, "https://img.example/two.png")
        .await
        .expect("screenshot failed");

    let app = guildhall_router(GuildhallState::new(storage.clone()));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/player/Alice")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;

    assert_eq!(body["member"]["member"]["name"], "Alice");
    let urls: Vec<&str> = body["member"]["screenshots"]
        .as_array()
        .expect("screenshots missing")
        .iter()
        .map(|s| s["url"].as_str().expect("url missing"))
        .collect();
    assert_eq!(
        urls,
        vec!["https://img.example/one.png", "https://img.example/two.png"]
    );

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn unknown_player_redirects_to_not_found() {
    let (storage, temp_path) = temp_storage("route-player-missing").await;

    let app = guildhall_router(GuildhallState::new(storage.clone()));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/player/unknown-name")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers()
            .get(header::LOCATION)
            .expect("missing Location header"),
        "/404"
    );

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn logout_without_session_fails_with_401() {
    let (storage, temp_path) = temp_storage("route-logout-anon").await;

    let app = guildhall_router(GuildhallState::new(storage.clone()));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // no stray session rows were touched
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM session")
        .fetch_one(storage.pool())
        .await
        .expect("count failed");
    assert_eq!(count, 0);

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn logout_with_session_invalidates_and_redirects_home() {
    let (storage, temp_path) = temp_storage("route-logout").await;

    let user = storage
        .create_user("alice", "argon2-hash", None)
        .await
        .expect("user failed");
    let token = auth::generate_session_token();
    let session = auth::create_session(&storage, &token, &user.id)
        .await
        .expect("session failed");

    let app = guildhall_router(GuildhallState::new(storage.clone()));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, format!("auth-session={token}"))
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers()
            .get(header::LOCATION)
            .expect("missing Location header"),
        "/"
    );

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie header")
        .to_str()
        .expect("Set-Cookie was not utf-8");
    assert!(set_cookie.starts_with("auth-session="));
    assert!(set_cookie.contains("Max-Age=0"));

    let remaining = storage
        .session_with_user(&session.id)
        .await
        .expect("lookup failed");
    assert!(remaining.is_none());

    let _ = fs::remove_file(&temp_path);
}
