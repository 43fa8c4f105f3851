//! Bookshelf application: feature modules wired onto the shared kernel.

pub mod modules;
pub mod state;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_inference::{HuggingFaceClient, HuggingFaceConfig, TextGenerator};
use bookshelf_kernel::{settings::InferenceSettings, InitCtx, ModuleRegistry, Settings};

pub use state::AppState;

/// A fully initialized application: schema applied, modules initialized.
pub struct Application {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect to the configured database and the hosted model, then initialize.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database.url, settings.database.max_connections)
            .await
            .with_context(|| format!("failed to open database {}", settings.database.url))?;
        let inference = inference_client(&settings.inference);

        Self::build_with(settings, db, inference).await
    }

    /// Initialize against an existing database and text generator.
    pub async fn build_with(
        settings: Settings,
        db: Database,
        inference: Arc<dyn TextGenerator>,
    ) -> anyhow::Result<Self> {
        let state = AppState::new(db.clone(), &settings, inference);
        let registry = build_registry(&state);

        let applied = apply_migrations(&db, &registry).await?;
        tracing::info!(applied, modules = registry.len(), "schema ready");

        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        registry.init_all(&ctx).await?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The complete HTTP router, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Serve until a shutdown signal, then stop modules and close the pool.
    pub async fn serve(self) -> anyhow::Result<()> {
        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_all().await?;
        self.db.close().await;
        served
    }
}

/// Registry holding every feature module, bound to `state`.
pub fn build_registry(state: &AppState) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, state);
    registry
}

/// Create any missing tables. Returns how many migrations ran.
pub async fn apply_migrations(db: &Database, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    db.create_schema(&registry.collect_migrations())
        .await
        .context("failed to apply migrations")
}

pub fn inference_client(settings: &InferenceSettings) -> Arc<dyn TextGenerator> {
    Arc::new(HuggingFaceClient::new(HuggingFaceConfig {
        base_url: settings.base_url.clone(),
        model: settings.model.clone(),
        api_key: settings.api_key.clone(),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
        top_p: settings.top_p,
    }))
}

/// Load settings, install telemetry, and serve.
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookshelf bootstrap starting"
    );

    Application::build(settings).await?.serve().await
}
