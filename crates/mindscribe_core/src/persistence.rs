//! Persistence adapter between entity collections and key-value storage.
//!
//! # Responsibility
//! - Serialize whole collections to JSON under namespaced keys.
//! - Absorb storage failures so callers keep running on in-memory state.
//!
//! # Invariants
//! - `load` never fails: missing or undecodable values yield the default.
//! - `save` never fails loudly: it reports `false` and logs instead.
//! - Bulk operations only touch keys under the adapter's prefix.

use crate::repo::kv_repo::{utf16_bytes, KvRepository};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Namespace prefix for every key written by the application.
pub const DEFAULT_PREFIX: &str = "mindscribe_";

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Named collections persisted by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Notes,
    Tasks,
    Events,
    Bookmarks,
    Projects,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 5] = [
        Self::Notes,
        Self::Tasks,
        Self::Events,
        Self::Bookmarks,
        Self::Projects,
    ];

    /// Key suffix appended to the storage prefix.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Tasks => "tasks",
            Self::Events => "events",
            Self::Bookmarks => "bookmarks",
            Self::Projects => "projects",
        }
    }
}

/// Load/save boundary over a [`KvRepository`].
pub struct Storage<R: KvRepository> {
    repo: R,
    prefix: String,
}

impl<R: KvRepository> Storage<R> {
    /// Creates an adapter using [`DEFAULT_PREFIX`].
    pub fn new(repo: R) -> Self {
        Self::with_prefix(repo, DEFAULT_PREFIX)
    }

    pub fn with_prefix(repo: R, prefix: impl Into<String>) -> Self {
        Self {
            repo,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full storage key for a named collection.
    pub fn key_for(&self, collection: CollectionKey) -> String {
        format!("{}{}", self.prefix, collection.suffix())
    }

    /// Reads and decodes `key`, falling back to `default` on any failure.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.repo.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                error!("event=storage_load module=persistence status=error key={key} error={err}");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_load module=persistence status=fallback key={key} error_code=decode_failed error={err}"
                );
                default
            }
        }
    }

    /// Encodes and stores `value` under `key`.
    ///
    /// Returns `false` when encoding or the underlying write failed.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(
                    "event=storage_save module=persistence status=error key={key} error_code=encode_failed error={err}"
                );
                return false;
            }
        };

        match self.repo.set(key, &encoded) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=storage_save module=persistence status=error key={key} error_code=write_failed error={err}"
                );
                false
            }
        }
    }

    /// Removes one key. Removing an absent key still counts as success.
    pub fn remove(&self, key: &str) -> bool {
        match self.repo.delete(key) {
            Ok(_) => true,
            Err(err) => {
                error!("event=storage_remove module=persistence status=error key={key} error={err}");
                false
            }
        }
    }

    /// Removes every key under this adapter's prefix.
    ///
    /// Unrelated keys sharing the repository are left untouched.
    pub fn clear_all(&self) -> bool {
        let keys = match self.repo.keys_with_prefix(&self.prefix) {
            Ok(keys) => keys,
            Err(err) => {
                error!("event=storage_clear module=persistence status=error error={err}");
                return false;
            }
        };

        keys.iter().fold(true, |ok, key| self.remove(key) && ok)
    }

    /// Estimated bytes used by all values under the prefix (2 bytes/char).
    pub fn usage(&self) -> u64 {
        let keys = match self.repo.keys_with_prefix(&self.prefix) {
            Ok(keys) => keys,
            Err(err) => {
                error!("event=storage_usage module=persistence status=error error={err}");
                return 0;
            }
        };

        keys.iter()
            .filter_map(|key| self.repo.get(key).ok().flatten())
            .map(|value| utf16_bytes(&value))
            .sum()
    }

    /// [`Storage::usage`] expressed in megabytes.
    pub fn usage_megabytes(&self) -> f64 {
        self.usage() as f64 / BYTES_PER_MEGABYTE
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionKey, Storage};
    use crate::repo::kv_repo::{KvRepository, MemoryKvRepository};

    #[test]
    fn collection_keys_are_prefixed() {
        let storage = Storage::new(MemoryKvRepository::new());
        assert_eq!(storage.key_for(CollectionKey::Notes), "mindscribe_notes");
        assert_eq!(
            storage.key_for(CollectionKey::Bookmarks),
            "mindscribe_bookmarks"
        );
    }

    #[test]
    fn load_returns_default_for_corrupted_value() {
        let repo = MemoryKvRepository::new();
        repo.insert_raw("mindscribe_notes", "{not json");
        let storage = Storage::new(&repo);

        let loaded: Vec<String> = storage.load("mindscribe_notes", vec!["fallback".to_string()]);
        assert_eq!(loaded, vec!["fallback".to_string()]);
    }

    #[test]
    fn clear_all_keeps_foreign_keys() {
        let repo = MemoryKvRepository::new();
        repo.set("other_app", "1").unwrap();
        let storage = Storage::new(&repo);
        assert!(storage.save("mindscribe_tasks", &vec![1, 2, 3]));

        assert!(storage.clear_all());
        assert_eq!(repo.get("mindscribe_tasks").unwrap(), None);
        assert_eq!(repo.get("other_app").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn usage_counts_only_prefixed_values() {
        let repo = MemoryKvRepository::new();
        repo.set("other_app", "ignored value").unwrap();
        let storage = Storage::new(&repo);
        assert!(storage.save("mindscribe_tags", &vec!["ab"]));

        // `["ab"]` is 6 chars.
        assert_eq!(storage.usage(), 12);
    }
}
