mod common;

use axum::http::StatusCode;
use bookshelf_app::modules::reviews::models::Review;
use bookshelf_db::Filters;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn book_without_reviews_averages_zero() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;
    let id = app
        .create_book(&cookie, "Dune", "Frank Herbert", "Science Fiction")
        .await;

    let response = app.get(&format!("/books/{id}/summary"), &cookie).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["average_rating"], 0.0);
    assert_eq!(response.body["review_count"], 0);
    assert_eq!(response.body["book"]["title"], "Dune");
}

#[tokio::test]
async fn summary_averages_every_rating() {
    let app = TestApp::spawn().await;
    let ada = app.signed_in("ada").await;
    let grace = app.signed_in("grace").await;
    let id = app
        .create_book(&ada, "Dune", "Frank Herbert", "Science Fiction")
        .await;

    for (cookie, rating) in [(&ada, 3), (&grace, 4), (&ada, 5)] {
        assert_eq!(app.review(cookie, id, rating).await.status, StatusCode::CREATED);
    }

    let response = app.get(&format!("/books/{id}/summary"), &ada).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["average_rating"], 4.0);
    assert_eq!(response.body["review_count"], 3);
}

#[tokio::test]
async fn summary_of_unknown_book_is_not_found() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;

    let response = app.get("/books/42/summary", &cookie).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_is_attributed_to_the_signed_in_user() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;
    let id = app
        .create_book(&cookie, "Dune", "Frank Herbert", "Science Fiction")
        .await;

    let response = app.review(&cookie, id, 4).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["book_id"], id);
    assert_eq!(response.body["rating"], 4);

    let listing = app.get(&format!("/books/{id}/reviews"), &cookie).await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(
        listing.body,
        json!([{
            "id": response.body["id"],
            "username": "ada",
            "title": "Dune",
            "review_text": "4 stars",
            "rating": 4
        }])
    );
}

#[tokio::test]
async fn reviews_of_a_book_without_any_is_empty() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;
    let id = app
        .create_book(&cookie, "Dune", "Frank Herbert", "Science Fiction")
        .await;

    let listing = app.get(&format!("/books/{id}/reviews"), &cookie).await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body, json!([]));
}

#[tokio::test]
async fn review_input_is_validated() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;
    let id = app
        .create_book(&cookie, "Dune", "Frank Herbert", "Science Fiction")
        .await;
    let uri = format!("/books/{id}/reviews");

    let cases = [
        json!({ "rating": 4 }),
        json!({ "review_text": "Fine" }),
        json!({ "review_text": "Too good", "rating": 6 }),
        json!({ "review_text": "Too bad", "rating": 0 }),
    ];
    for body in cases {
        let response = app.post(&uri, body.clone(), &cookie).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
    }

    let reviews = app.db.fetch_all::<Review>(&Filters::new()).await.unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn reviewing_an_unknown_book_is_not_found() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("ada").await;

    let response = app.review(&cookie, 77, 5).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
