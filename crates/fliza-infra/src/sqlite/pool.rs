//! SQLite connection management for the message store.
//!
//! SQLite serializes writers, so a single large pool would let read
//! traffic queue behind inserts. [`DatabasePool`] keeps two pools over
//! the same file instead: a one-connection write pool (inserts from the
//! chat path) and a read pool sized from [`DatabaseConfig`] (history
//! queries). WAL journal mode lets the readers proceed while a write is
//! in progress.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use fliza_types::config::DatabaseConfig;

/// Paired read/write pools over one SQLite file.
#[derive(Clone)]
pub struct DatabasePool {
    /// Read pool for history queries; sized by `max_read_connections`.
    pub reader: SqlitePool,
    /// Single-connection pool serializing all inserts.
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open both pools and bring the schema up to date.
    ///
    /// The writer connects first and runs pending migrations; the read
    /// pool opens read-only afterwards, so it never sees a half-migrated
    /// schema. `busy_timeout_secs` bounds how long either side waits on a
    /// locked database.
    pub async fn new(database_url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let busy_timeout = Duration::from_secs(config.busy_timeout_secs);
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(busy_timeout)
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(config.max_read_connections)
            .connect_with(options.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}
