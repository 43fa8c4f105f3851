//! Record shapes the store knows how to read and write.

use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::filter::Patch;

/// A row type mapped to a table.
///
/// `COLUMNS` lists every column, `id` included, and is the allow-list used to
/// validate filter and patch keys.
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Generated primary key.
    fn id(&self) -> i64;
}

/// A value that can be inserted as a new row of `Self::Entity`.
pub trait NewRecord: Send + Sync {
    type Entity: Entity;

    /// Column values for the INSERT; `id` is left to the database.
    fn values(&self) -> Patch;
}
