//! Model-backed features: reading recommendations and generated book summaries.

pub mod handlers;
pub mod prompt;

use async_trait::async_trait;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use bookshelf_authz::require_session;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use crate::state::AppState;

pub struct RecommendationsModule {
    state: AppState,
}

impl RecommendationsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for RecommendationsModule {
    fn name(&self) -> &'static str {
        "recommendations"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let inference = &ctx.settings.inference;
        if inference.api_key.is_none() {
            tracing::warn!(
                module = self.name(),
                "no inference API key configured; recommendation and summary requests will fail"
            );
        }
        tracing::info!(module = self.name(), model = %inference.model, "module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/recommendations", get(handlers::recommendations))
            .route(
                "/books/{id}/generate-summary",
                post(handlers::generate_summary),
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

        Some(json!({
            "paths": {
                "/recommendations": {
                    "get": {
                        "summary": "Model-written recommendations based on the caller's reviews",
                        "tags": ["Recommendations"],
                        "responses": {
                            "200": {
                                "description": "Recommendations",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "recommendations": { "type": "string" } },
                                            "required": ["recommendations"]
                                        }
                                    }
                                }
                            },
                            "403": error,
                            "500": error
                        }
                    }
                },
                "/books/{id}/generate-summary": {
                    "post": {
                        "summary": "Generate and store a summary for a book",
                        "tags": ["Recommendations"],
                        "parameters": [{ "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }],
                        "responses": {
                            "200": {
                                "description": "Generated summary",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "summary": { "type": "string" } },
                                            "required": ["summary"]
                                        }
                                    }
                                }
                            },
                            "403": error,
                            "404": error,
                            "500": error
                        }
                    }
                }
            }
        }))
    }
}
