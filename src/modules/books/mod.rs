//! The catalog: create, list, fetch, patch, and delete books.

pub mod handlers;
pub mod models;

use async_trait::async_trait;
use axum::{middleware, routing::get, Router};
use bookshelf_authz::require_session;
use bookshelf_db::{Database, Filters};
use bookshelf_http::AppResult;
use bookshelf_kernel::{Migration, Module};
use serde_json::json;

use crate::state::AppState;
use models::Book;

pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

/// Fetch a book by id or fail with 404.
pub(crate) async fn load_book(db: &Database, id: i64) -> AppResult<Book> {
    db.fetch_one::<Book>(&Filters::by_id(id))
        .await?
        .ok_or_else(|| handlers::book_not_found(id))
}

pub(crate) fn schema() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                title          TEXT    NOT NULL,
                author         TEXT    NOT NULL,
                genre          TEXT    NOT NULL,
                year_published INTEGER,
                summary        TEXT
            );
            "#,
    }]
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/books",
                get(handlers::list_books).post(handlers::create_book),
            )
            .route(
                "/books/{id}",
                get(handlers::get_book)
                    .put(handlers::update_book)
                    .delete(handlers::delete_book),
            )
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
        let book = json!({
            "description": "Book",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Book" } } }
        });
        let id_param = json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }]);
        let payload = json!({
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookPayload" } } }
        });

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                                    }
                                }
                            },
                            "403": error
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": payload,
                        "responses": { "201": book, "400": error, "403": error }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Fetch a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": { "200": book, "403": error, "404": error }
                    },
                    "put": {
                        "summary": "Update the fields present in the body",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": payload,
                        "responses": { "200": book, "400": error, "403": error, "404": error }
                    },
                    "delete": {
                        "summary": "Delete a book and its reviews",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Deleted",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "object", "properties": { "message": { "type": "string" } } }
                                    }
                                }
                            },
                            "403": error,
                            "404": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "year_published": { "type": "integer", "nullable": true },
                            "summary": { "type": "string", "nullable": true }
                        },
                        "required": ["id", "title", "author", "genre"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "genre": { "type": "string" },
                            "year_published": { "type": "integer" },
                            "summary": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        schema()
    }
}
