//! Schema bootstrap from module-contributed migrations.

use crate::error::Result;
use crate::store::Database;

/// Migration definition for modules
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

impl Database {
    /// Ensure every table exists. Safe to call on each start.
    ///
    /// Each `(module, migration)` pair runs at most once, in the given order,
    /// inside its own transaction. Returns how many were applied this time.
    pub async fn create_schema(&self, migrations: &[(String, Migration)]) -> Result<usize> {
        sqlx::raw_sql(LEDGER_DDL).execute(self.pool()).await?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let mut tx = self.pool().begin().await?;

            let seen: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM schema_migrations WHERE module = ? AND id = ?",
            )
            .bind(module)
            .bind(migration.id)
            .fetch_one(&mut *tx)
            .await?;

            if seen > 0 {
                continue;
            }

            sqlx::raw_sql(migration.up).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_migrations (module, id) VALUES (?, ?)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(target: "bookshelf-db", module = %module, migration = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }
}
