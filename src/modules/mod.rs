pub mod books;
pub mod recommendations;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use bookshelf_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register every feature module. Order matters: each module's tables may
/// reference tables created by the modules before it.
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) {
    registry.register(Arc::new(users::UsersModule::new(state.clone())));
    registry.register(Arc::new(books::BooksModule::new(state.clone())));
    registry.register(Arc::new(reviews::ReviewsModule::new(state.clone())));
    registry.register(Arc::new(recommendations::RecommendationsModule::new(
        state.clone(),
    )));
}
