//! In-memory store for tests and `tooby eval`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    Result,
    record::{Record, RecordKind, normalize_name},
    store::RecordStore,
};

/// In-memory store backed by a `Vec`. No persistence.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Record>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-filled with `(kind, name, value)` triples.
    pub fn with_records<'a>(records: impl IntoIterator<Item = (RecordKind, &'a str, &'a str)>) -> Self {
        let records = records
            .into_iter()
            .map(|(kind, name, value)| Record::new(kind, name, value, None))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn get_all(&self, kind: RecordKind, name: &str) -> Result<Vec<Record>> {
        let name = normalize_name(name);
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .iter()
            .filter(|r| r.kind == kind && r.name == name)
            .cloned()
            .collect())
    }

    async fn all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.iter().filter(|r| r.kind == kind).cloned().collect())
    }

    async fn set(
        &self,
        kind: RecordKind,
        name: &str,
        value: &str,
        added_by: Option<&str>,
    ) -> Result<()> {
        let record = Record::new(kind, name, value, added_by);
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.retain(|r| !(r.kind == kind && r.name == record.name));
        records.push(record);
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
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record);
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, name: &str) -> Result<u64> {
        let name = normalize_name(name);
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|r| !(r.kind == kind && r.name == name));
        Ok((before - records.len()) as u64)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::Error,
        secrecy::ExposeSecret,
    };

    #[tokio::test]
    async fn set_then_get_round_trip() {
        let store = InMemoryStore::new();
        store
            .set(RecordKind::Variables, "greeting", "hi", Some("jazzyeagle"))
            .await
            .unwrap();
        assert_eq!(
            store.get(RecordKind::Variables, "Greeting").await.unwrap(),
            "hi"
        );
    }

    #[tokio::test]
    async fn set_replaces_every_existing_value() {
        let store = InMemoryStore::with_records([
            (RecordKind::Variables, "greeting", "hi"),
            (RecordKind::Variables, "greeting", "hello"),
        ]);
        store
            .set(RecordKind::Variables, "greeting", "hey", None)
            .await
            .unwrap();
        let all = store.get_all(RecordKind::Variables, "greeting").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, "hey");
    }

    #[tokio::test]
    async fn add_keeps_existing_values() {
        let store = InMemoryStore::new();
        store.add(RecordKind::Quotes, "bob", "one", None).await.unwrap();
        store.add(RecordKind::Quotes, "bob", "two", None).await.unwrap();
        assert_eq!(store.get_all(RecordKind::Quotes, "bob").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get(RecordKind::Variables, "nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.to_string(), "variable nope not found");
    }

    #[tokio::test]
    async fn get_single_record_is_deterministic() {
        let store = InMemoryStore::with_records([(RecordKind::Variables, "howareyou", "good")]);
        for _ in 0..10 {
            assert_eq!(
                store.get(RecordKind::Variables, "howareyou").await.unwrap(),
                "good"
            );
        }
    }

    #[tokio::test]
    async fn get_many_records_returns_one_of_them() {
        let store = InMemoryStore::with_records([
            (RecordKind::Variables, "greeting", "hi"),
            (RecordKind::Variables, "greeting", "hello"),
            (RecordKind::Variables, "greeting", "hey"),
        ]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(store.get(RecordKind::Variables, "greeting").await.unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn kinds_are_separate_namespaces() {
        let store = InMemoryStore::with_records([(RecordKind::Commands, "hello", "{sender}")]);
        assert!(store.exists(RecordKind::Commands, "hello").await.unwrap());
        assert!(!store.exists(RecordKind::Variables, "hello").await.unwrap());
        assert_eq!(store.script("HELLO").await.unwrap(), "{sender}");
    }

    #[tokio::test]
    async fn delete_counts_removed_records() {
        let store = InMemoryStore::with_records([
            (RecordKind::Quotes, "bob", "one"),
            (RecordKind::Quotes, "bob", "two"),
            (RecordKind::Quotes, "alice", "three"),
        ]);
        assert_eq!(store.delete(RecordKind::Quotes, "bob").await.unwrap(), 2);
        assert_eq!(store.delete(RecordKind::Quotes, "bob").await.unwrap(), 0);
        assert_eq!(store.names(RecordKind::Quotes).await.unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn connection_settings_are_scoped_by_platform() {
        let store = InMemoryStore::new();
        store
            .set_connection_setting("twitch", "botnick", "toobybot")
            .await
            .unwrap();
        store
            .set_connection_setting("twitch", "oauth-token", "oauth:abc")
            .await
            .unwrap();
        store
            .set_connection_setting("twitch", "channel", "jazzyeagle")
            .await
            .unwrap();
        store
            .set_connection_setting("twitch", "Channel", "stylerun09")
            .await
            .unwrap();
        store
            .set_connection_setting("discord", "botnick", "other")
            .await
            .unwrap();

        let cfg = store.connection_settings("twitch").await.unwrap();
        assert_eq!(cfg.botnick, "toobybot");
        assert_eq!(cfg.oauth_token.expose_secret(), "oauth:abc");
        assert_eq!(cfg.channels, vec!["jazzyeagle", "stylerun09"]);
    }
}
