// ── Persistent store ──
//
// SQLite behind an async pool. The engine is the only writer of
// connection state; user CRUD and read-only status queries share the
// same pool. Transaction isolation is the whole concurrency story --
// there is no application-level locking on top.

mod devices;
mod history;
mod threats;
mod tick;
mod webhooks;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

use crate::error::CoreError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Handle to the roamwatch database. Cheap to clone; all methods take
/// `&self` and go through the shared pool.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Open (creating if missing) the database at `path` and run any
    /// pending migrations.
    pub async fn open(path: &Path) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;
        debug!(path = %path.display(), "store opened");

        Ok(Self { pool })
    }

    /// Open an in-memory database (tests, `--ephemeral` runs).
    ///
    /// Capped at one connection: each SQLite `:memory:` connection is its
    /// own database, so a larger pool would see different schemas.
    pub async fn open_in_memory() -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(CoreError::from)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the pool, flushing outstanding writes.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Whether a sqlx error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.is_unique_violation()
    )
}
