use axum::{
    extract::State,
    Json,
};
use bookshelf_authz::Session;
use bookshelf_db::{Filters, Patch, Value};
use bookshelf_http::{ApiPath, AppResult};
use serde::Serialize;

use super::prompt::{recommendation_prompt, summary_prompt, Preference};
use crate::modules::books::{handlers::book_not_found, load_book, models::Book};
use crate::state::AppState;

const PREFERENCES_SQL: &str = r#"
    SELECT DISTINCT b.author AS author, b.genre AS genre
    FROM reviews r
    JOIN books b ON b.id = r.book_id
    WHERE r.user_id = ?
    ORDER BY b.author, b.genre
"#;

#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub recommendations: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedSummary {
    pub summary: String,
}

/// Ask the model for books matching what the caller has reviewed. The model's
/// text is returned untouched.
pub async fn recommendations(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Recommendations>> {
    let preferences = state
        .db
        .execute_raw_as::<Preference>(PREFERENCES_SQL, &[Value::from(session.user_id)])
        .await?;

    let prompt = recommendation_prompt(&session.username, &preferences);
    tracing::info!(
        user_id = session.user_id,
        preferences = preferences.len(),
        "requesting recommendations"
    );

    let text = state.inference.generate_text(&prompt).await?;
    Ok(Json(Recommendations {
        recommendations: text,
    }))
}

/// Generate a summary for a book and store it on the book.
pub async fn generate_summary(
    State(state): State<AppState>,
    ApiPath(book_id): ApiPath<i64>,
) -> AppResult<Json<GeneratedSummary>> {
    let book = load_book(&state.db, book_id).await?;
    let summary = state.inference.generate_text(&summary_prompt(&book)).await?;

    let updated = state
        .db
        .update_matching::<Book>(
            &Filters::by_id(book_id),
            &Patch::new().eq("summary", summary.as_str()),
        )
        .await?;
    // Deleted while the model was generating.
    if updated.is_empty() {
        return Err(book_not_found(book_id));
    }

    tracing::info!(book_id, chars = summary.len(), "book summary generated");
    Ok(Json(GeneratedSummary { summary }))
}
