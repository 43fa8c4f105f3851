use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use bookshelf_db::{Filters, Patch};
use bookshelf_http::{ApiJson, ApiPath, AppError, AppResult};

use super::load_book;
use super::models::{Book, BookPayload, Message, NewBook};
use crate::state::AppState;
use crate::utils::{non_blank, required};

pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let record = NewBook {
        title: required("title", body.title)?,
        author: required("author", body.author)?,
        genre: required("genre", body.genre)?,
        year_published: body.year_published,
        summary: body.summary,
    };

    let book = state.db.add(&record).await?;
    tracing::info!(book_id = book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.db.fetch_all::<Book>(&Filters::new()).await?))
}

pub async fn get_book(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> AppResult<Json<Book>> {
    Ok(Json(load_book(&state.db, id).await?))
}

/// Patch only the fields present in the body.
pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<BookPayload>,
) -> AppResult<Json<Book>> {
    let patch = Patch::new()
        .eq_some("title", non_blank("title", body.title)?)
        .eq_some("author", non_blank("author", body.author)?)
        .eq_some("genre", non_blank("genre", body.genre)?)
        .eq_some("year_published", body.year_published)
        .eq_some("summary", body.summary);

    let updated = state
        .db
        .update_matching::<Book>(&Filters::by_id(id), &patch)
        .await?;

    let book = updated.into_iter().next().ok_or_else(|| book_not_found(id))?;
    tracing::info!(book_id = id, fields = patch.len(), "book updated");
    Ok(Json(book))
}

pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Message>> {
    let book = load_book(&state.db, id).await?;
    if !state.db.delete(&book).await? {
        return Err(book_not_found(id));
    }

    tracing::info!(book_id = id, "book deleted");
    Ok(Json(Message {
        message: "Book deleted successfully".to_string(),
    }))
}

pub(crate) fn book_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Book {id} not found"))
}
