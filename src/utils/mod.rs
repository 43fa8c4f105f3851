//! Small helpers shared by the request handlers.

use bookshelf_http::{AppError, AppResult};

/// Unwrap a required body field, rejecting absent or blank values.
pub fn required(field: &str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::missing_field(field)),
    }
}

/// Like [`required`], but an absent value is fine. Used by partial updates.
pub fn non_blank(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    value.map(|value| required(field, Some(value))).transpose()
}
