//! Generic create/read/update/delete over any [`Entity`].
//!
//! Every call runs in its own transaction: begin, do the work, commit. An
//! early return drops the transaction, which rolls it back and hands the
//! connection back to the pool.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Sqlite};

use crate::entity::{Entity, NewRecord};
use crate::error::{Result, StoreError};
use crate::filter::{Filters, Patch, Value};

/// Shared handle to the connection pool. Clones are cheap.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(target: "bookshelf-db", %url, max_connections, "database pool ready");
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection that never expires keeps
    /// every caller looking at the same data.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// All rows of `E` matching `filters`. No ordering guarantee, no paging.
    pub async fn fetch_all<E: Entity>(&self, filters: &Filters) -> Result<Vec<E>> {
        filters.check::<E>()?;

        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", E::TABLE));
        filters.push_where(&mut builder);

        let mut tx = self.pool.begin().await?;
        let rows = builder.build_query_as::<E>().fetch_all(&mut *tx).await?;
        tx.commit().await?;

        Ok(rows)
    }

    /// First row of `E` matching `filters`, or `None`.
    pub async fn fetch_one<E: Entity>(&self, filters: &Filters) -> Result<Option<E>> {
        filters.check::<E>()?;

        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", E::TABLE));
        filters.push_where(&mut builder);
        builder.push(" LIMIT 1");

        let mut tx = self.pool.begin().await?;
        let row = builder
            .build_query_as::<E>()
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(row)
    }

    /// Insert `record` and return the stored row with its generated id.
    pub async fn add<N: NewRecord>(&self, record: &N) -> Result<N::Entity> {
        let values = record.values();
        values.check::<N::Entity>()?;

        let table = <N::Entity as Entity>::TABLE;
        let mut builder = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {table}"));
        values.push_insert(&mut builder);
        builder.push(" RETURNING *");

        let mut tx = self.pool.begin().await?;
        let row = builder
            .build_query_as::<N::Entity>()
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(target: "bookshelf-db", table, id = row.id(), "row inserted");
        Ok(row)
    }

    /// Apply `patch` to every row matching `filters` and return the updated rows.
    ///
    /// An empty patch writes nothing and returns the matching rows as they are.
    pub async fn update_matching<E: Entity>(
        &self,
        filters: &Filters,
        patch: &Patch,
    ) -> Result<Vec<E>> {
        if patch.is_empty() {
            return self.fetch_all(filters).await;
        }
        filters.check::<E>()?;
        patch.check::<E>()?;

        let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", E::TABLE));
        patch.push_assignments(&mut builder);
        filters.push_where(&mut builder);
        builder.push(" RETURNING *");

        let mut tx = self.pool.begin().await?;
        let rows = builder.build_query_as::<E>().fetch_all(&mut *tx).await?;
        tx.commit().await?;

        tracing::debug!(target: "bookshelf-db", table = E::TABLE, updated = rows.len(), "rows updated");
        Ok(rows)
    }

    /// Remove exactly `record`, by id. Returns whether a row was deleted.
    pub async fn delete<E: Entity>(&self, record: &E) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", E::TABLE))
            .bind(record.id())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(target: "bookshelf-db", table = E::TABLE, id = record.id(), "row deleted");
        Ok(result.rows_affected() > 0)
    }

    /// Run hand-written SQL with positional `?` parameters and return the raw rows.
    pub async fn execute_raw(&self, sql: &str, params: &[Value]) -> Result<Vec<SqliteRow>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = param.bind_to(query);
        }

        let mut tx = self.pool.begin().await?;
        let rows = query.fetch_all(&mut *tx).await?;
        tx.commit().await?;

        Ok(rows)
    }

    /// [`Database::execute_raw`], decoding each row into `T`.
    pub async fn execute_raw_as<T>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow>,
    {
        self.execute_raw(sql, params)
            .await?
            .iter()
            .map(|row| T::from_row(row).map_err(StoreError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Migration;
    use sqlx::Row;

    #[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
    struct Shelf {
        id: i64,
        label: String,
        room: Option<String>,
    }

    impl Entity for Shelf {
        const TABLE: &'static str = "shelves";
        const COLUMNS: &'static [&'static str] = &["id", "label", "room"];

        fn id(&self) -> i64 {
            self.id
        }
    }

    struct NewShelf<'a> {
        label: &'a str,
        room: Option<&'a str>,
    }

    impl NewRecord for NewShelf<'_> {
        type Entity = Shelf;

        fn values(&self) -> Patch {
            Patch::new().eq("label", self.label).eq("room", self.room)
        }
    }

    async fn shelves_db() -> Database {
        let db = Database::connect_in_memory().await.unwrap();
        let migrations = vec![(
            "shelves".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE IF NOT EXISTS shelves (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        label TEXT NOT NULL UNIQUE,
                        room TEXT
                     );",
            },
        )];
        db.create_schema(&migrations).await.unwrap();
        db
    }

    #[tokio::test]
    async fn add_assigns_ids_and_fetch_one_finds_them() {
        let db = shelves_db().await;
        let first = db
            .add(&NewShelf {
                label: "fiction",
                room: Some("study"),
            })
            .await
            .unwrap();
        let second = db
            .add(&NewShelf {
                label: "poetry",
                room: None,
            })
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let found: Option<Shelf> = db.fetch_one(&Filters::by_id(second.id)).await.unwrap();
        assert_eq!(found, Some(second));
    }

    #[tokio::test]
    async fn fetch_one_without_match_is_none() {
        let db = shelves_db().await;
        let found: Option<Shelf> = db.fetch_one(&Filters::by_id(404)).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_unique_column_is_a_constraint_violation() {
        let db = shelves_db().await;
        let shelf = NewShelf {
            label: "fiction",
            room: None,
        };
        db.add(&shelf).await.unwrap();
        let err = db.add(&shelf).await.unwrap_err();
        assert!(err.is_constraint_violation(), "got {err:?}");
    }

    #[tokio::test]
    async fn fetch_all_ands_filters() {
        let db = shelves_db().await;
        for (label, room) in [("a", "study"), ("b", "study"), ("c", "hall")] {
            db.add(&NewShelf {
                label,
                room: Some(room),
            })
            .await
            .unwrap();
        }

        let study: Vec<Shelf> = db
            .fetch_all(&Filters::new().eq("room", "study"))
            .await
            .unwrap();
        assert_eq!(study.len(), 2);

        let one: Vec<Shelf> = db
            .fetch_all(&Filters::new().eq("room", "study").eq("label", "b"))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);

        let all: Vec<Shelf> = db.fetch_all(&Filters::new()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn update_matching_patches_every_match() {
        let db = shelves_db().await;
        for label in ["a", "b"] {
            db.add(&NewShelf {
                label,
                room: Some("study"),
            })
            .await
            .unwrap();
        }

        let moved: Vec<Shelf> = db
            .update_matching(
                &Filters::new().eq("room", "study"),
                &Patch::new().eq("room", "attic"),
            )
            .await
            .unwrap();
        assert_eq!(moved.len(), 2);
        assert!(moved.iter().all(|s| s.room.as_deref() == Some("attic")));

        let none: Vec<Shelf> = db
            .update_matching(
                &Filters::new().eq("room", "cellar"),
                &Patch::new().eq("room", "attic"),
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn null_filter_matches_rows_without_a_value() {
        let db = shelves_db().await;
        db.add(&NewShelf {
            label: "loose",
            room: None,
        })
        .await
        .unwrap();
        let placed = db
            .add(&NewShelf {
                label: "placed",
                room: Some("hall"),
            })
            .await
            .unwrap();

        let unplaced = Filters::new().eq("room", Option::<&str>::None);
        let rows: Vec<Shelf> = db.fetch_all(&unplaced).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "loose");

        let one: Option<Shelf> = db.fetch_one(&unplaced).await.unwrap();
        assert_eq!(one.map(|s| s.label).as_deref(), Some("loose"));

        let moved: Vec<Shelf> = db
            .update_matching(&unplaced, &Patch::new().eq("room", "attic"))
            .await
            .unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].room.as_deref(), Some("attic"));

        let cleared: Vec<Shelf> = db
            .update_matching(
                &Filters::by_id(placed.id),
                &Patch::new().eq("room", Option::<&str>::None),
            )
            .await
            .unwrap();
        assert_eq!(cleared[0].room, None);

        let still_unplaced: Vec<Shelf> = db.fetch_all(&unplaced).await.unwrap();
        assert_eq!(still_unplaced.len(), 1);
        assert_eq!(still_unplaced[0].label, "placed");
    }

    #[tokio::test]
    async fn unknown_columns_are_rejected() {
        let db = shelves_db().await;
        let err = db
            .fetch_all::<Shelf>(&Filters::new().eq("colour", "red"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { table: "shelves", .. }));
    }

    #[tokio::test]
    async fn delete_removes_only_that_row() {
        let db = shelves_db().await;
        let keep = db
            .add(&NewShelf {
                label: "keep",
                room: None,
            })
            .await
            .unwrap();
        let drop = db
            .add(&NewShelf {
                label: "drop",
                room: None,
            })
            .await
            .unwrap();

        assert!(db.delete(&drop).await.unwrap());
        assert!(!db.delete(&drop).await.unwrap());

        let left: Vec<Shelf> = db.fetch_all(&Filters::new()).await.unwrap();
        assert_eq!(left, vec![keep]);
    }

    #[tokio::test]
    async fn execute_raw_binds_positional_params() {
        let db = shelves_db().await;
        for label in ["a", "b", "c"] {
            db.add(&NewShelf {
                label,
                room: Some("hall"),
            })
            .await
            .unwrap();
        }

        let rows = db
            .execute_raw(
                "SELECT room, COUNT(*) AS n FROM shelves WHERE room = ? GROUP BY room",
                &[Value::from("hall")],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<i64, _>("n"), 3);
    }
}
