mod common;

use axum::http::{header, Method, StatusCode};
use bookshelf_app::modules::{books::models::Book, users::models::User};
use bookshelf_db::Filters;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn registering_a_username_twice_fails_the_second_time() {
    let app = TestApp::spawn().await;

    let first = app.register("ada", "pw-123456").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["is_success"], true);

    let second = app.register("ada", "another-pw").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["is_success"], false);

    let users = app.db.fetch_all::<User>(&Filters::new()).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn register_requires_every_field() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Method::POST,
            "/register",
            Some(json!({ "username": "ada", "password": "pw", "email": "ada@example.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"]["message"], "'full_name' is required");
}

#[tokio::test]
async fn password_is_stored_hashed() {
    let app = TestApp::spawn().await;
    app.register("ada", "pw-123456").await;

    let user = app
        .db
        .fetch_one::<User>(&Filters::new().eq("username", "ada"))
        .await
        .unwrap()
        .unwrap();
    assert_ne!(user.password_hash, "pw-123456");
    assert!(!user.password_hash.contains("pw-123456"));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("ada", "pw-123456").await;

    let response = app.login("ada", "not-the-password").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["is_success"], false);
    assert!(response.headers.get(header::SET_COOKIE).is_none());

    let response = app.login("nobody", "pw-123456").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_an_http_only_session_cookie() {
    let app = TestApp::spawn().await;
    app.register("ada", "pw-123456").await;

    let response = app.login("ada", "pw-123456").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_success"], true);
    assert_eq!(response.body["username"], "ada");
    assert_eq!(response.body["email"], "ada@example.com");

    let raw = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(raw.starts_with("bookshelf_session="));
    assert!(raw.contains("HttpOnly"));
}

#[tokio::test]
async fn profile_returns_the_signed_in_user_without_the_hash() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;

    let response = app.get("/profile", &cookie).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "ada");
    assert_eq!(response.body["full_name"], "Test Reader");
    assert!(response.body.get("password_hash").is_none());
}

#[tokio::test]
async fn profile_of_a_deleted_user_is_not_found() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;

    let user = app
        .db
        .fetch_one::<User>(&Filters::new().eq("username", "ada"))
        .await
        .unwrap()
        .unwrap();
    app.db.delete(&user).await.unwrap();

    let response = app.get("/profile", &cookie).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;

    let response = app
        .request(Method::POST, "/logout", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_success"], true);

    let raw = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(raw.contains("Max-Age=0"));
}

#[tokio::test]
async fn guarded_endpoints_refuse_anonymous_callers() {
    let app = TestApp::spawn().await;

    let cases = [
        (Method::POST, "/logout", None),
        (Method::GET, "/profile", None),
        (Method::GET, "/books", None),
        (
            Method::POST,
            "/books",
            Some(json!({ "title": "Dune", "author": "Frank Herbert", "genre": "Science Fiction" })),
        ),
        (Method::GET, "/books/1", None),
        (Method::PUT, "/books/1", Some(json!({ "title": "Changed" }))),
        (Method::DELETE, "/books/1", None),
        (
            Method::POST,
            "/books/1/reviews",
            Some(json!({ "review_text": "Great", "rating": 5 })),
        ),
        (Method::GET, "/books/1/reviews", None),
        (Method::GET, "/books/1/summary", None),
        (Method::GET, "/recommendations", None),
        (Method::POST, "/books/1/generate-summary", None),
    ];

    for (method, uri, body) in cases {
        let response = app.request(method.clone(), uri, body, None).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(response.body["error"]["code"], "forbidden");
    }

    let books = app.db.fetch_all::<Book>(&Filters::new()).await.unwrap();
    assert!(books.is_empty());
    assert!(app.generator.prompts().is_empty());
}

#[tokio::test]
async fn tampered_session_cookie_is_refused() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;

    let tampered = format!("{cookie}x");
    let response = app.get("/books", &tampered).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_and_docs_are_public() {
    let app = TestApp::spawn().await;

    let health = app.request(Method::GET, "/healthz", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert!(health.headers.contains_key("x-request-id"));

    let docs = app
        .request(Method::GET, "/docs/openapi.json", None, None)
        .await;
    assert_eq!(docs.status, StatusCode::OK);
    for path in ["/register", "/books/{id}", "/books/{id}/summary", "/recommendations"] {
        assert!(docs.body["paths"][path].is_object(), "missing {path}");
    }
}
