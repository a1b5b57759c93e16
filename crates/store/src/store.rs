//! The store gateway consumed by the interpreter and the transport.

use {async_trait::async_trait, tooby_config::TwitchAccountConfig, tracing::debug};

use crate::{
    error::{Error, Result},
    record::{Record, RecordKind, normalize_name, select_random},
};

/// Persistence backend for named records.
///
/// Implementations must be safe for concurrent use; every method takes
/// `&self`. Names are matched case-insensitively.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record of `kind` stored under `name`, oldest first.
    async fn get_all(&self, kind: RecordKind, name: &str) -> Result<Vec<Record>>;

    /// Every record of `kind`, oldest first.
    async fn all(&self, kind: RecordKind) -> Result<Vec<Record>>;

    /// Replace whatever is stored under `name` with a single record.
    async fn set(
        &self,
        kind: RecordKind,
        name: &str,
        value: &str,
        added_by: Option<&str>,
    ) -> Result<()>;

    /// Append another record under `name`, keeping existing ones.
    async fn add(
        &self,
        kind: RecordKind,
        name: &str,
        value: &str,
        added_by: Option<&str>,
    ) -> Result<()>;

    /// Remove every record under `name`; returns how many were removed.
    async fn delete(&self, kind: RecordKind, name: &str) -> Result<u64>;

    /// Resolve a kind name (`"variables"`, `"quote"`, ...).
    fn record_kind(&self, kind: &str) -> Result<RecordKind> {
        kind.parse()
    }

    async fn exists(&self, kind: RecordKind, name: &str) -> Result<bool> {
        Ok(!self.get_all(kind, name).await?.is_empty())
    }

    /// One value stored under `name`, drawn uniformly when there are several.
    async fn get(&self, kind: RecordKind, name: &str) -> Result<String> {
        let records = self.get_all(kind, name).await?;
        select_random(&records)
            .map(|r| r.value.clone())
            .ok_or_else(|| Error::not_found(kind, normalize_name(name)))
    }

    /// The script bound to a command.
    async fn script(&self, command: &str) -> Result<String> {
        self.get(RecordKind::Commands, command).await
    }

    /// Distinct names stored for `kind`, sorted.
    async fn names(&self, kind: RecordKind) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.all(kind).await?.into_iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Connection settings stored for a platform plugin.
    async fn connection_settings(&self, platform: &str) -> Result<TwitchAccountConfig> {
        let prefix = format!("{}.", normalize_name(platform));
        let rows: Vec<(String, String)> = self
            .all(RecordKind::Settings)
            .await?
            .into_iter()
            .filter_map(|r| {
                r.name
                    .strip_prefix(&prefix)
                    .map(|field| (field.to_string(), r.value))
            })
            .collect();
        debug!(platform, fields = rows.len(), "loaded connection settings");
        Ok(TwitchAccountConfig::from_settings(rows))
    }

    /// Store one connection setting. `channel` rows accumulate; every other
    /// field is replaced.
    async fn set_connection_setting(&self, platform: &str, field: &str, value: &str) -> Result<()> {
        let field = normalize_name(field);
        let name = format!("{}.{field}", normalize_name(platform));
        if field == "channel" {
            self.add(RecordKind::Settings, &name, value, None).await
        } else {
            self.set(RecordKind::Settings, &name, value, None).await
        }
    }
}
