//! Snapshot Backend Tests
//!
//! Exercise each backend directly, without a store around it.

use std::fs;

use chrono::{Duration, Utc};
use rusqlite::Connection;
use tempfile::TempDir;
use ttlkv::persistence::{
    JsonFileBackend, NoopBackend, SnapshotBackend, SnapshotFileBackend, SqliteBackend,
};
use ttlkv::store::Table;
use ttlkv::{BackendConfig, Entry, TtlKvError};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_table() -> Table {
    let mut table = Table::new();
    table.insert("user:1".to_string(), Entry::new("alice"));
    table.insert(
        "session:1".to_string(),
        Entry::expiring("token", Utc::now() + Duration::seconds(30)),
    );
    table.insert("empty".to_string(), Entry::new(""));
    table
}

fn restore(backend: &dyn SnapshotBackend) -> Table {
    let mut table = Table::new();
    backend.restore_into(&mut table).unwrap();
    table
}

// =============================================================================
// Noop Backend Tests
// =============================================================================

#[test]
fn test_noop_keeps_nothing() {
    let backend = NoopBackend;
    backend.save(&sample_table()).unwrap();

    assert!(restore(&backend).is_empty());
    assert_eq!(backend.name(), "noop");
}

// =============================================================================
// JSON Backend Tests
// =============================================================================

#[test]
fn test_json_save_and_restore() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("snap.json"));
    let table = sample_table();

    backend.save(&table).unwrap();

    assert_eq!(restore(&backend), table);
}

#[test]
fn test_json_document_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.json");
    let backend = JsonFileBackend::new(&path);

    backend.save(&sample_table()).unwrap();

    let doc: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let user = &doc["user:1"];
    assert_eq!(user["value"], "alice");
    assert!(user["created_at"].is_string());
    assert!(user["expires_at"].is_null());
    assert!(doc["session:1"]["expires_at"].is_string());
}

#[test]
fn test_json_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("nothing-here.json"));

    assert!(restore(&backend).is_empty());
}

#[test]
fn test_json_save_replaces_previous() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("snap.json"));

    backend.save(&sample_table()).unwrap();
    let mut smaller = Table::new();
    smaller.insert("only".to_string(), Entry::new("one"));
    backend.save(&smaller).unwrap();

    assert_eq!(restore(&backend), smaller);
}

#[test]
fn test_json_save_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("snap.json"));

    backend.save(&sample_table()).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["snap.json"]);
}

#[test]
fn test_json_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("snap.json");
    let backend = JsonFileBackend::new(&path);

    backend.save(&sample_table()).unwrap();

    assert!(path.exists());
}

#[test]
fn test_json_garbage_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.json");
    fs::write(&path, b"[1, 2, 3]").unwrap();

    let mut table = Table::new();
    let err = JsonFileBackend::new(&path)
        .restore_into(&mut table)
        .unwrap_err();

    assert!(matches!(err, TtlKvError::Serialization(_)));
}

// =============================================================================
// Snapshot File Backend Tests
// =============================================================================

#[test]
fn test_snapshot_file_save_and_restore() {
    let dir = TempDir::new().unwrap();
    let backend = SnapshotFileBackend::new(dir.path().join("snap.bin"));
    let table = sample_table();

    backend.save(&table).unwrap();

    assert_eq!(restore(&backend), table);
}

#[test]
fn test_snapshot_file_empty_table() {
    let dir = TempDir::new().unwrap();
    let backend = SnapshotFileBackend::new(dir.path().join("snap.bin"));

    backend.save(&Table::new()).unwrap();

    assert!(restore(&backend).is_empty());
}

#[test]
fn test_snapshot_file_corruption_detected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.bin");
    let backend = SnapshotFileBackend::new(&path);
    backend.save(&sample_table()).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let middle = bytes.len() / 2 + 13;
    bytes[middle] ^= 0x55;
    fs::write(&path, &bytes).unwrap();

    let mut table = Table::new();
    let err = backend.restore_into(&mut table).unwrap_err();
    assert!(matches!(err, TtlKvError::Persistence(_)));
    assert!(table.is_empty());
}

#[test]
fn test_snapshot_file_missing_is_empty() {
    let dir = TempDir::new().unwrap();
    let backend = SnapshotFileBackend::new(dir.path().join("absent.bin"));

    assert!(restore(&backend).is_empty());
}

// =============================================================================
// SQLite Backend Tests
// =============================================================================

#[test]
fn test_sqlite_save_and_restore() {
    let backend = SqliteBackend::in_memory().unwrap();
    let table = sample_table();

    backend.save(&table).unwrap();

    assert_eq!(backend.row_count().unwrap(), 3);
    assert_eq!(restore(&backend), table);
}

#[test]
fn test_sqlite_save_replaces_rows() {
    let backend = SqliteBackend::in_memory().unwrap();

    backend.save(&sample_table()).unwrap();
    backend.save(&Table::new()).unwrap();

    assert_eq!(backend.row_count().unwrap(), 0);
    assert!(restore(&backend).is_empty());
}

#[test]
fn test_sqlite_persists_across_connections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.db");
    let table = sample_table();

    SqliteBackend::open(&path).unwrap().save(&table).unwrap();

    let reopened = SqliteBackend::open(&path).unwrap();
    assert_eq!(restore(&reopened), table);
}

#[test]
fn test_sqlite_skips_unreadable_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.db");
    let backend = SqliteBackend::open(&path).unwrap();
    backend.save(&sample_table()).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "INSERT INTO cache_snapshot (id, json_value) VALUES ('bad', 'not json')",
        [],
    )
    .unwrap();
    drop(conn);

    let table = restore(&backend);
    assert_eq!(table.len(), 3);
    assert!(!table.contains_key("bad"));
}

#[test]
fn test_sqlite_row_holds_entry_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snap.db");
    let backend = SqliteBackend::open(&path).unwrap();
    backend.save(&sample_table()).unwrap();

    let conn = Connection::open(&path).unwrap();
    let json: String = conn
        .query_row(
            "SELECT json_value FROM cache_snapshot WHERE id = 'user:1'",
            [],
            |row| row.get(0),
        )
        .unwrap();

    let entry: Entry = serde_json::from_str(&json).unwrap();
    assert_eq!(entry.value, "alice");
}

// =============================================================================
// Backend Selection Tests
// =============================================================================

#[test]
fn test_backend_config_builds_each_kind() {
    let dir = TempDir::new().unwrap();

    let cases = [
        (BackendConfig::None, "noop"),
        (
            BackendConfig::JsonFile {
                path: dir.path().join("a.json"),
            },
            "json-file",
        ),
        (
            BackendConfig::SnapshotFile {
                path: dir.path().join("a.bin"),
            },
            "snapshot-file",
        ),
        (
            BackendConfig::Sqlite {
                path: dir.path().join("a.db"),
            },
            "sqlite",
        ),
    ];

    for (config, name) in cases {
        assert_eq!(config.build().unwrap().name(), name);
    }
}
