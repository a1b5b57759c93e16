//! SQLite-backed record store using sqlx.

use {
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
    tracing::debug,
};

use crate::{
    Result,
    error::Error,
    record::{Record, RecordKind, normalize_name},
    store::RecordStore,
};

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct RecordRow {
    kind: String,
    name: String,
    value: String,
    added_by: Option<String>,
    created_at: i64,
}

impl TryFrom<RecordRow> for Record {
    type Error = Error;

    fn try_from(r: RecordRow) -> Result<Self> {
        Ok(Self {
            kind: r.kind.parse()?,
            name: r.name,
            value: r.value,
            added_by: r.added_by,
            created_at: r.created_at,
        })
    }
}

/// SQLite-backed persistence for records.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `database_url` and run migrations.
    ///
    /// In-memory URLs get a single connection so every query sees the same
    /// database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        crate::run_migrations(&pool).await?;
        debug!(database_url, "record store ready");

        Ok(Self { pool })
    }

    /// Create a store using an existing pool (migrations must already be run).
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert<'e, E>(executor: E, record: &Record) -> Result<()>
    where
        E: sqlx::SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO records (kind, name, value, added_by, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.kind.as_str())
        .bind(&record.name)
        .bind(&record.value)
        .bind(&record.added_by)
        .bind(record.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_all(&self, kind: RecordKind, name: &str) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT kind, name, value, added_by, created_at FROM records
             WHERE kind = ? AND name = ? ORDER BY id",
        )
        .bind(kind.as_str())
        .bind(normalize_name(name))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT kind, name, value, added_by, created_at FROM records
             WHERE kind = ? ORDER BY id",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn set(
        &self,
        kind: RecordKind,
        name: &str,
        value: &str,
        added_by: Option<&str>,
    ) -> Result<()> {
        let record = Record::new(kind, name, value, added_by);
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM records WHERE kind = ? AND name = ?")
            .bind(kind.as_str())
            .bind(&record.name)
            .execute(&mut *tx)
            .await?;
        Self::insert(&mut *tx, &record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn add(
        &self,
        kind: RecordKind,
        name: &str,
        value: &str,
        added_by: Option<&str>,
    ) -> Result<()> {
        let record = Record::new(kind, name, value, added_by);
        Self::insert(&self.pool, &record).await
    }

    async fn delete(&self, kind: RecordKind, name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM records WHERE kind = ? AND name = ?")
            .bind(kind.as_str())
            .bind(normalize_name(name))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn make_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_set_get() {
        let store = make_store().await;
        store
            .set(RecordKind::Variables, "Greeting", "hi", Some("jazzyeagle"))
            .await
            .unwrap();

        assert_eq!(
            store.get(RecordKind::Variables, "greeting").await.unwrap(),
            "hi"
        );
        let all = store.get_all(RecordKind::Variables, "GREETING").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].added_by.as_deref(), Some("jazzyeagle"));
    }

    #[tokio::test]
    async fn test_sqlite_set_replaces() {
        let store = make_store().await;
        store.add(RecordKind::Variables, "greeting", "hi", None).await.unwrap();
        store.add(RecordKind::Variables, "greeting", "hello", None).await.unwrap();
        store.set(RecordKind::Variables, "greeting", "hey", None).await.unwrap();

        let all = store.get_all(RecordKind::Variables, "greeting").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, "hey");
    }

    #[tokio::test]
    async fn test_sqlite_add_keeps_order() {
        let store = make_store().await;
        store.add(RecordKind::Quotes, "bob", "first", Some("alice")).await.unwrap();
        store.add(RecordKind::Quotes, "bob", "second", Some("alice")).await.unwrap();

        let values: Vec<String> = store
            .get_all(RecordKind::Quotes, "bob")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_sqlite_get_not_found() {
        let store = make_store().await;
        let err = store.get(RecordKind::Commands, "nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_sqlite_delete() {
        let store = make_store().await;
        store.add(RecordKind::Quotes, "bob", "one", None).await.unwrap();
        store.add(RecordKind::Quotes, "bob", "two", None).await.unwrap();
        assert_eq!(store.delete(RecordKind::Quotes, "bob").await.unwrap(), 2);
        assert!(!store.exists(RecordKind::Quotes, "bob").await.unwrap());
        assert_eq!(store.delete(RecordKind::Quotes, "bob").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sqlite_names_and_settings() {
        let store = make_store().await;
        store.set(RecordKind::Commands, "hello", "{sender}", None).await.unwrap();
        store.set(RecordKind::Commands, "so", "{channel}", None).await.unwrap();
        store
            .set_connection_setting("twitch", "botnick", "toobybot")
            .await
            .unwrap();
        store
            .set_connection_setting("twitch", "channels", "jazzyeagle,stylerun09")
            .await
            .unwrap();

        assert_eq!(
            store.names(RecordKind::Commands).await.unwrap(),
            vec!["hello", "so"]
        );
        let cfg = store.connection_settings("twitch").await.unwrap();
        assert_eq!(cfg.botnick, "toobybot");
        assert_eq!(cfg.channels, vec!["jazzyeagle", "stylerun09"]);
    }
}
