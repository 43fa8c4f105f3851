//! Prompt text sent to the hosted model.

use std::fmt::Write;

use crate::modules::books::models::Book;

/// One author/genre combination the reader has reviewed.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Preference {
    pub author: String,
    pub genre: String,
}

pub fn recommendation_prompt(username: &str, preferences: &[Preference]) -> String {
    if preferences.is_empty() {
        return format!(
            "You are a well-read librarian. {username} has not reviewed any books yet. \
             Recommend five widely loved books from different genres, giving the title, \
             the author, and one sentence on why each is worth reading."
        );
    }

    let mut prompt = format!(
        "You are a well-read librarian. {username} has reviewed books by the following \
         authors and genres:\n"
    );
    for preference in preferences {
        let _ = writeln!(prompt, "- {} ({})", preference.author, preference.genre);
    }
    prompt.push_str(
        "Recommend five books they have not necessarily read that match these tastes. \
         For each, give the title, the author, and one sentence on why it fits.",
    );
    prompt
}

pub fn summary_prompt(book: &Book) -> String {
    let mut prompt = format!(
        "Write a concise, spoiler-free summary of the book \"{}\" by {}. Genre: {}.",
        book.title, book.author, book.genre
    );
    if let Some(year) = book.year_published {
        let _ = write!(prompt, " First published in {year}.");
    }
    if let Some(summary) = book.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = write!(prompt, "\nExisting description: {summary}");
    }
    prompt.push_str("\nKeep it under 150 words.");
    prompt
}
