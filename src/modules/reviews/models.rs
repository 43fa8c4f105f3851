use bookshelf_db::{Entity, NewRecord, Patch};
use serde::{Deserialize, Serialize};

use crate::modules::books::models::Book;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub review_text: String,
    pub rating: i64,
}

impl Entity for Review {
    const TABLE: &'static str = "reviews";
    const COLUMNS: &'static [&'static str] = &["id", "book_id", "user_id", "review_text", "rating"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: i64,
    pub user_id: i64,
    pub review_text: String,
    pub rating: i64,
}

impl NewRecord for NewReview {
    type Entity = Review;

    fn values(&self) -> Patch {
        Patch::new()
            .eq("book_id", self.book_id)
            .eq("user_id", self.user_id)
            .eq("review_text", self.review_text.as_str())
            .eq("rating", self.rating)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub review_text: Option<String>,
    pub rating: Option<i64>,
}

/// A review joined with its author's username and the book title.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReviewListing {
    pub id: i64,
    pub username: String,
    pub title: String,
    pub review_text: String,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct BookSummary {
    pub book: Book,
    pub average_rating: f64,
    pub review_count: usize,
}

/// Arithmetic mean of `ratings`, or exactly `0.0` when there are none.
pub fn average_rating(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_no_ratings_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn average_is_exact_for_whole_means() {
        assert_eq!(average_rating(&[3, 4, 5]), 4.0);
        assert_eq!(average_rating(&[5]), 5.0);
    }

    #[test]
    fn average_keeps_fractions() {
        assert_eq!(average_rating(&[4, 5]), 4.5);
    }
}
