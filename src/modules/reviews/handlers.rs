use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use bookshelf_authz::Session;
use bookshelf_db::{Filters, Value};
use bookshelf_http::{ApiJson, ApiPath, AppError, AppResult};

use super::models::{
    average_rating, BookSummary, NewReview, Review, ReviewListing, ReviewPayload, MAX_RATING,
    MIN_RATING,
};
use crate::modules::books::load_book;
use crate::state::AppState;
use crate::utils::required;

const LISTING_SQL: &str = r#"
    SELECT r.id AS id, u.username AS username, b.title AS title,
           r.review_text AS review_text, r.rating AS rating
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    JOIN books b ON b.id = r.book_id
    WHERE r.book_id = ?
    ORDER BY r.id
"#;

pub async fn add_review(
    State(state): State<AppState>,
    session: Session,
    ApiPath(book_id): ApiPath<i64>,
    ApiJson(body): ApiJson<ReviewPayload>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review_text = required("review_text", body.review_text)?;
    let rating = body.rating.ok_or_else(|| AppError::missing_field("rating"))?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::bad_request(format!(
            "'rating' must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    load_book(&state.db, book_id).await?;

    let review = state
        .db
        .add(&NewReview {
            book_id,
            user_id: session.user_id,
            review_text,
            rating,
        })
        .await?;

    tracing::info!(review_id = review.id, book_id, user_id = session.user_id, "review added");
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(book_id): ApiPath<i64>,
) -> AppResult<Json<Vec<ReviewListing>>> {
    let reviews = state
        .db
        .execute_raw_as::<ReviewListing>(LISTING_SQL, &[Value::from(book_id)])
        .await?;
    Ok(Json(reviews))
}

pub async fn book_summary(
    State(state): State<AppState>,
    ApiPath(book_id): ApiPath<i64>,
) -> AppResult<Json<BookSummary>> {
    let book = load_book(&state.db, book_id).await?;
    let ratings: Vec<i64> = state
        .db
        .fetch_all::<Review>(&Filters::new().eq("book_id", book_id))
        .await?
        .into_iter()
        .map(|review| review.rating)
        .collect();

    Ok(Json(BookSummary {
        book,
        average_rating: average_rating(&ratings),
        review_count: ratings.len(),
    }))
}
