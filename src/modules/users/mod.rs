//! Accounts: registration, sign-in/out, and the caller's profile.

pub mod handlers;
pub mod models;
pub mod service;

use async_trait::async_trait;
use axum::{middleware, routing::get, routing::post, Router};
use bookshelf_authz::require_session;
use bookshelf_kernel::{Migration, Module};
use serde_json::json;

use crate::state::AppState;

pub struct UsersModule {
    state: AppState,
}

impl UsersModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

pub(crate) fn schema() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                username      TEXT    NOT NULL UNIQUE,
                password_hash TEXT    NOT NULL,
                email         TEXT    NOT NULL,
                full_name     TEXT    NOT NULL
            );
            "#,
    }]
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    fn routes(&self) -> Router {
        let guarded = Router::new()
            .route("/logout", post(handlers::logout))
            .route("/profile", get(handlers::profile))
            .route_layer(middleware::from_fn_with_state(
                self.state.sessions.clone(),
                require_session,
            ));

        Router::new()
            .route("/register", post(handlers::register))
            .route("/login", post(handlers::login))
            .merge(guarded)
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let outcome = json!({
            "description": "Outcome",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/AuthOutcome" } } }
        });
        let error = json!({
            "description": "Error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a new account",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/RegisterRequest" } } }
                        },
                        "responses": { "200": outcome, "400": error, "409": outcome }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Sign in and receive a session cookie",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LoginRequest" } } }
                        },
                        "responses": { "200": outcome, "400": error, "401": outcome }
                    }
                },
                "/logout": {
                    "post": {
                        "summary": "Sign out and clear the session cookie",
                        "tags": ["Users"],
                        "responses": { "200": outcome, "403": error }
                    }
                },
                "/profile": {
                    "get": {
                        "summary": "Profile of the signed-in user",
                        "tags": ["Users"],
                        "responses": {
                            "200": {
                                "description": "Current user",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
                            },
                            "403": error,
                            "404": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "username": { "type": "string" },
                            "email": { "type": "string" },
                            "full_name": { "type": "string" }
                        },
                        "required": ["id", "username", "email", "full_name"]
                    },
                    "RegisterRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" },
                            "email": { "type": "string" },
                            "full_name": { "type": "string" }
                        },
                        "required": ["username", "password", "email", "full_name"]
                    },
                    "LoginRequest": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string" },
                            "password": { "type": "string" }
                        },
                        "required": ["username", "password"]
                    },
                    "AuthOutcome": {
                        "type": "object",
                        "properties": {
                            "is_success": { "type": "boolean" },
                            "message": { "type": "string" },
                            "username": { "type": "string" },
                            "email": { "type": "string" },
                            "full_name": { "type": "string" }
                        },
                        "required": ["is_success", "message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        schema()
    }
}
