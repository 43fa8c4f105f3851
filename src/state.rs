use std::sync::Arc;

use bookshelf_authz::SessionKeys;
use bookshelf_db::Database;
use bookshelf_inference::TextGenerator;
use bookshelf_kernel::Settings;

/// Handles shared by every feature module. Cloned into each router.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionKeys,
    pub inference: Arc<dyn TextGenerator>,
    pub password_cost: u32,
}

impl AppState {
    pub fn new(db: Database, settings: &Settings, inference: Arc<dyn TextGenerator>) -> Self {
        Self {
            db,
            sessions: SessionKeys::from_settings(&settings.auth),
            inference,
            password_cost: settings.auth.password_cost,
        }
    }
}
