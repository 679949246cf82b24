use mindscribe_core::db::migrations::latest_version;
use mindscribe_core::db::{open_db, open_db_in_memory, DbError};
use mindscribe_core::{KvRepository, SqliteKvRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn reopening_file_database_keeps_stored_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mindscribe.db");

    let conn_first = open_db(&path).unwrap();
    SqliteKvRepository::new(&conn_first)
        .set("mindscribe_notes", "[]")
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let repo = SqliteKvRepository::new(&conn_second);
    assert_eq!(
        repo.get("mindscribe_notes").unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_repository_upserts_and_lists_by_prefix() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteKvRepository::new(&conn);

    repo.set("mindscribe_tasks", "[1]").unwrap();
    repo.set("mindscribe_tasks", "[2]").unwrap();
    repo.set("mindscribe_notes", "[]").unwrap();
    repo.set("mindscribeXnotes", "[]").unwrap();
    repo.set("other_app", "{}").unwrap();

    assert_eq!(repo.get("mindscribe_tasks").unwrap().as_deref(), Some("[2]"));
    assert_eq!(
        repo.keys_with_prefix("mindscribe_").unwrap(),
        vec!["mindscribe_notes".to_string(), "mindscribe_tasks".to_string()]
    );
    assert!(repo.delete("other_app").unwrap());
    assert!(!repo.delete("other_app").unwrap());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
