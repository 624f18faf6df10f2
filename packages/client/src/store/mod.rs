//! Local persistence store
//!
//! A flat key-value repository holding JSON documents. Implementations are
//! injected so tests run against [`MemoryStore`] and hosts against
//! [`SqliteStore`]. Writes are last-writer-wins; there are no transactions
//! across keys and no cross-process coordination.

pub mod keys;
pub mod memory;
pub mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value under {key:?} has unexpected shape: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw string key-value operations.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Returns whether a value was present.
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

/// Typed JSON helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key)? {
            Some(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let payload = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &payload)
    }

    /// Missing or malformed values yield `T::default()`. Decode failures are
    /// logged; backend failures still propagate.
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> StoreResult<T> {
        match self.get_json(key) {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(StoreError::Decode { key, source }) => {
                warn!(key = %key, error = %source, "discarding malformed stored value");
                Ok(T::default())
            }
            Err(err) => Err(err),
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn typed_roundtrip() {
        let store = MemoryStore::new();
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u32);
        store.set_json("counts", &map).unwrap();
        let loaded: Option<BTreeMap<String, u32>> = store.get_json("counts").unwrap();
        assert_eq!(loaded, Some(map));
    }

    #[test]
    fn get_json_reports_decode_error() {
        let store = MemoryStore::new();
        store.set("modules", "{not json").unwrap();
        let err = store.get_json::<Vec<String>>("modules").unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "modules"));
    }

    #[test]
    fn load_or_default_recovers_from_bad_shape() {
        let store = MemoryStore::new();
        store.set("modules", "{\"unexpected\": true}").unwrap();
        let modules: Vec<String> = store.load_or_default("modules").unwrap();
        assert!(modules.is_empty());

        let missing: Vec<String> = store.load_or_default("absent").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn works_through_trait_object() {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set_json("n", &5).unwrap();
        assert_eq!(store.get_json::<i32>("n").unwrap(), Some(5));
    }
}
