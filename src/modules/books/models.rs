use bookshelf_db::{Entity, NewRecord, Patch};
use serde::{Deserialize, Serialize};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: Option<i64>,
    pub summary: Option<String>,
}

impl Entity for Book {
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] =
        &["id", "title", "author", "genre", "year_published", "summary"];

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year_published: Option<i64>,
    pub summary: Option<String>,
}

impl NewRecord for NewBook {
    type Entity = Book;

    fn values(&self) -> Patch {
        Patch::new()
            .eq("title", self.title.as_str())
            .eq("author", self.author.as_str())
            .eq("genre", self.genre.as_str())
            .eq("year_published", self.year_published)
            .eq("summary", self.summary.clone())
    }
}

/// Body of `POST /books` and `PUT /books/{id}`. Every field is optional here;
/// the handlers decide which ones are required.
#[derive(Debug, Default, Deserialize)]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year_published: Option<i64>,
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}
