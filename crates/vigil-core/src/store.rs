//! Storage abstraction for decision records.
//!
//! Decision logic is independent of the backing store: records go through a
//! small key-value interface so an in-memory map, a key-value service, or a
//! relational table can back it without touching the engines. Decision
//! records are append-only audit data; the engines never update or delete
//! them, only add new keys.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value storage boundary for decision records.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store a value under a key.
    async fn put(&self, key: String, value: serde_json::Value) -> Result<()>;

    /// Fetch the value for a key, if present.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Remove a key. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and prototyping.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn put(&self, key: String, value: serde_json::Value) -> Result<()> {
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryStore::new();
        assert!(store.is_empty().await);

        store
            .put("decision/1".to_string(), serde_json::json!({"score": 0.5}))
            .await
            .unwrap();

        let value = store.get("decision/1").await.unwrap().unwrap();
        assert_eq!(value["score"], 0.5);
        assert_eq!(store.len().await, 1);

        store.delete("decision/1").await.unwrap();
        assert!(store.get("decision/1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_none_not_error() {
        let store = InMemoryStore::new();
        assert!(store.get("absent").await.unwrap().is_none());
        store.delete("absent").await.unwrap();
    }
}
