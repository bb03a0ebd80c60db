#![warn(missing_docs)]
//! SQLite-backed auction store.
//!
//! Implements the [`hammer_core::ports::AuctionStore`] port over a single
//! SQLite database: one row per auction plus an append-only `bids` table
//! keyed by `(auction_id, seq)`. The leaderboard is never stored; it is
//! always derivable from the bid list.

use sqlx::sqlite;
use std::{
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::try_join;

pub mod config;
mod impls;
pub mod types;

use config::SqliteConfig;

/// SQLite database implementation of the auction store.
///
/// Provides separate reader and writer connection pools. The writer pool is
/// capped at one connection so writes are serialized, which is how SQLite
/// wants to be used under Write-Ahead Logging; readers proceed concurrently.
#[derive(Clone)]
pub struct Db {
    /// Connection pool for read operations
    pub reader: sqlx::Pool<sqlx::Sqlite>,
    /// Connection pool for write operations (limited to 1 connection)
    pub writer: sqlx::Pool<sqlx::Sqlite>,
}

impl Db {
    /// Open a connection to the specified SQLite database.
    ///
    /// Creates the database if it does not exist (when `create_if_missing`
    /// is set) and applies all pending migrations. When no path is
    /// configured, a process-private shared-cache in-memory database is used
    /// so the reader pool sees the writer's data; each open gets a distinct
    /// one.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established or the
    /// migrations fail to apply.
    pub async fn open(config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        static MEMORY_SEQ: AtomicU64 = AtomicU64::new(0);

        let db_path = config
            .database_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        let in_memory = db_path.is_none();

        let url = db_path.unwrap_or_else(|| {
            format!(
                "file:hammer-{}?mode=memory&cache=shared",
                MEMORY_SEQ.fetch_add(1, Ordering::Relaxed)
            )
        });

        let options = sqlite::SqliteConnectOptions::from_str(&url)?
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlite::SqliteSynchronous::Normal)
        .pragma("journal_size_limit", "27103364")
        .pragma("mmap_size", "134217728")
        .pragma("temp_store", "memory")
        .create_if_missing(config.create_if_missing);

        // in-memory databases evaporate when their last connection closes,
        // so keep at least one alive in each pool
        let pool_options = || {
            let options = sqlite::SqlitePoolOptions::new();
            if in_memory {
                options
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                options
            }
        };

        let reader = pool_options().connect_with(options.clone());
        let writer = pool_options().max_connections(1).connect_with(options);

        let (reader, writer) = try_join!(reader, writer)?;

        sqlx::migrate!("./schema").run(&writer).await?;

        Ok(Self { reader, writer })
    }
}
