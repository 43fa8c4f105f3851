//! Reader reviews and per-book rating summaries.

pub mod handlers;
pub mod models;

use async_trait::async_trait;
use axum::{middleware, routing::get, Router};
use bookshelf_authz::require_session;
use bookshelf_kernel::{Migration, Module};
use serde_json::json;

use crate::state::AppState;

pub struct ReviewsModule {
    state: AppState,
}

impl ReviewsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

pub(crate) fn schema() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_reviews",
        up: r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id     INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                review_text TEXT    NOT NULL,
                rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5)
            );
            CREATE INDEX IF NOT EXISTS reviews_book_id ON reviews(book_id);
            CREATE INDEX IF NOT EXISTS reviews_user_id ON reviews(user_id);
            "#,
    }]
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/books/{id}/reviews",
                get(handlers::list_reviews).post(handlers::add_review),
            )
            .route("/books/{id}/summary", get(handlers::book_summary))
            .route_layer(middleware::from_fn_with_state(
                self.state.sessions.clone(),
                require_session,
            ))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "description": "Error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });
        let id_param = json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }]);

        Some(json!({
            "paths": {
                "/books/{id}/reviews": {
                    "get": {
                        "summary": "Reviews of a book with reviewer and title",
                        "tags": ["Reviews"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Reviews",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/ReviewListing" } }
                                    }
                                }
                            },
                            "403": error
                        }
                    },
                    "post": {
                        "summary": "Review a book as the signed-in user",
                        "tags": ["Reviews"],
                        "parameters": id_param,
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ReviewPayload" } } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created review",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Review" } } }
                            },
                            "400": error,
                            "403": error,
                            "404": error
                        }
                    }
                },
                "/books/{id}/summary": {
                    "get": {
                        "summary": "Book with its average rating and review count",
                        "tags": ["Reviews"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Summary",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookSummary" } } }
                            },
                            "403": error,
                            "404": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "book_id": { "type": "integer" },
                            "user_id": { "type": "integer" },
                            "review_text": { "type": "string" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 }
                        },
                        "required": ["id", "book_id", "user_id", "review_text", "rating"]
                    },
                    "ReviewPayload": {
                        "type": "object",
                        "properties": {
                            "review_text": { "type": "string" },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 }
                        },
                        "required": ["review_text", "rating"]
                    },
                    "ReviewListing": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "username": { "type": "string" },
                            "title": { "type": "string" },
                            "review_text": { "type": "string" },
                            "rating": { "type": "integer" }
                        },
                        "required": ["id", "username", "title", "review_text", "rating"]
                    },
                    "BookSummary": {
                        "type": "object",
                        "properties": {
                            "book": { "$ref": "#/components/schemas/Book" },
                            "average_rating": { "type": "number" },
                            "review_count": { "type": "integer" }
                        },
                        "required": ["book", "average_rating", "review_count"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        schema()
    }
}
