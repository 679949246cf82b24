//! Key-value repository contracts and implementations.
//!
//! # Responsibility
//! - Provide the raw string storage used by the persistence adapter.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Keys are opaque strings; namespacing is the caller's concern.
//! - `set` replaces the whole stored value (no partial updates).

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage failure surfaced by key-value repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Write would push the store beyond its configured capacity.
    QuotaExceeded { required_bytes: u64, quota_bytes: u64 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded: {required_bytes} bytes required, {quota_bytes} available"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for durable string storage.
pub trait KvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Returns `true` when a value was removed.
    fn delete(&self, key: &str) -> RepoResult<bool>;
    /// Lists stored keys starting with `prefix`, sorted ascending.
    fn keys_with_prefix(&self, prefix: &str) -> RepoResult<Vec<String>>;
}

impl<T: KvRepository + ?Sized> KvRepository for &T {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> RepoResult<bool> {
        (**self).delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> RepoResult<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }
}

/// SQLite-backed key-value repository over the `kv_store` table.
#[derive(Clone, Copy)]
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn keys_with_prefix(&self, prefix: &str) -> RepoResult<Vec<String>> {
        // substr comparison avoids LIKE wildcard escaping of `_` in prefixes.
        let mut stmt = self.conn.prepare(
            "SELECT key FROM kv_store
             WHERE substr(key, 1, length(?1)) = ?1
             ORDER BY key ASC;",
        )?;
        let mut rows = stmt.query([prefix])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}

/// In-memory key-value repository with an optional capacity limit.
///
/// Capacity is measured like browser storage: two bytes per UTF-16 code
/// unit of every stored value.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Stores a raw value without quota checks, e.g. to simulate corruption.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut entries = self.entries.borrow_mut();
        if let Some(quota_bytes) = self.quota_bytes {
            let others: u64 = entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(_, stored)| utf16_bytes(stored))
                .sum();
            let required_bytes = others + utf16_bytes(value);
            if required_bytes > quota_bytes {
                return Err(RepoError::QuotaExceeded {
                    required_bytes,
                    quota_bytes,
                });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> RepoResult<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn keys_with_prefix(&self, prefix: &str) -> RepoResult<Vec<String>> {
        Ok(self
            .entries
            .borrow()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Estimated storage footprint of `value` in a UTF-16 backed store.
pub fn utf16_bytes(value: &str) -> u64 {
    value.encode_utf16().count() as u64 * 2
}

#[cfg(test)]
mod tests {
    use super::{utf16_bytes, KvRepository, MemoryKvRepository, RepoError};

    #[test]
    fn utf16_estimate_counts_two_bytes_per_code_unit() {
        assert_eq!(utf16_bytes("abc"), 6);
        assert_eq!(utf16_bytes("é"), 2);
        assert_eq!(utf16_bytes("😀"), 4);
    }

    #[test]
    fn memory_repo_rejects_writes_over_quota() {
        let repo = MemoryKvRepository::with_quota(10);
        repo.set("a", "abcd").unwrap();

        let err = repo.set("b", "xyz").unwrap_err();
        assert!(matches!(
            err,
            RepoError::QuotaExceeded {
                required_bytes: 14,
                quota_bytes: 10
            }
        ));
        assert_eq!(repo.get("b").unwrap(), None);
    }

    #[test]
    fn memory_repo_quota_ignores_value_being_replaced() {
        let repo = MemoryKvRepository::with_quota(8);
        repo.set("a", "abcd").unwrap();
        repo.set("a", "wxyz").unwrap();
        assert_eq!(repo.get("a").unwrap().as_deref(), Some("wxyz"));
    }

    #[test]
    fn memory_repo_lists_keys_by_prefix() {
        let repo = MemoryKvRepository::new();
        repo.set("app_notes", "[]").unwrap();
        repo.set("app_tasks", "[]").unwrap();
        repo.set("other", "1").unwrap();

        assert_eq!(
            repo.keys_with_prefix("app_").unwrap(),
            vec!["app_notes".to_string(), "app_tasks".to_string()]
        );
        assert!(repo.delete("other").unwrap());
        assert!(!repo.delete("other").unwrap());
    }
}
