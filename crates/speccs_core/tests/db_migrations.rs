use rusqlite::Connection;
use speccs_core::db::migrations::latest_version;
use speccs_core::db::{open_database_url, open_db, open_db_in_memory, DbError};
use speccs_core::repo::ensure_connection_ready;
use speccs_core::{InventoryStore, StoreError};

const INVENTORY_TABLES: &[&str] = &[
    "properties",
    "buildings",
    "floors",
    "rooms",
    "assets",
    "connections",
    "journal_entries",
    "taxonomy_terms",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in INVENTORY_TABLES {
        assert_table_exists(&conn, table);
    }
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speccs.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "assets");

    let seeded: i64 = conn_second
        .query_row(
            "SELECT COUNT(*) FROM taxonomy_terms WHERE category = 'connection_type';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(seeded, 7);
}

#[test]
fn database_url_opens_file_and_memory_targets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from_url.sqlite3");
    let url = format!("sqlite://{}", path.display());

    let conn = open_database_url(&url).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());

    let memory = open_database_url("sqlite::memory:").unwrap();
    assert_eq!(schema_version(&memory), latest_version());
}

#[test]
fn database_url_rejects_other_engines() {
    let err = open_database_url("postgres://speccs:speccs@db:5432/speccs").unwrap_err();
    assert!(matches!(err, DbError::UnsupportedDatabaseUrl(_)));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = ensure_connection_ready(&conn).unwrap_err();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
    assert!(InventoryStore::try_new(&conn).is_err());
}

#[test]
fn store_rejects_connection_without_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();

    let err = InventoryStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, StoreError::InvalidData(_)));
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
