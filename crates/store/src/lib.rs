//! Record store: commands, variables, quotes and connection settings.
//!
//! The interpreter and the transport only see the [`RecordStore`] trait.
//! [`memory::InMemoryStore`] backs tests and one-off evaluation;
//! [`sqlite::SqliteStore`] is the persistent backend used by the bot.

pub mod error;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod store;

pub use {
    error::{Error, Result},
    memory::InMemoryStore,
    record::{Record, RecordKind, select_random},
    sqlite::SqliteStore,
    store::RecordStore,
};

/// Run database migrations for the record store.
///
/// Creates the `records` table. Called by [`SqliteStore::connect`]; call it
/// yourself before [`SqliteStore::with_pool`] on a shared pool.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
