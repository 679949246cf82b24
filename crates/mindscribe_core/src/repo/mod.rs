//! Repository layer for durable storage.
//!
//! # Responsibility
//! - Define the key-value contract the persistence adapter writes through.
//! - Isolate SQLite query details from collection management.
//!
//! # Invariants
//! - Repository errors are semantic (`QuotaExceeded`) or transport (`Db`).

pub mod kv_repo;
