use async_trait::async_trait;
use axum::Router;
use bookshelf_db::{Database, Migration};

/// What a module may look at while it initializes.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a Database,
}

/// A feature area of the service: its routes, API docs, tables, and lifecycle hooks.
#[async_trait]
pub trait Module: Sync + Send {
    /// Stable name used in logs and the migration ledger.
    fn name(&self) -> &'static str;

    /// Runs once at startup, after every module's tables exist.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes with absolute paths, already bound to their state.
    /// Merged into the root router as-is.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into the
    /// served document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// DDL this module owns, applied in order and recorded once applied.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs once after the server stops accepting requests.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
