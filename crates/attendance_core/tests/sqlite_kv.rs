use attendance_core::db::migrations::latest_version;
use attendance_core::db::{open_db, open_db_in_memory, DbError};
use attendance_core::{
    AttendanceStore, KeyValueStore, KvError, PresetGate, SqliteKeyValueStore, StoreConfig,
    ATTENDANCE_KEY,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_migrations() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1);
}

#[test]
fn get_set_delete_semantics() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();

    assert_eq!(kv.get("employees").unwrap(), None);
    kv.set("employees", "[]").unwrap();
    kv.set("employees", "{\"version\":1,\"items\":[]}").unwrap();
    assert_eq!(
        kv.get("employees").unwrap().as_deref(),
        Some("{\"version\":1,\"items\":[]}")
    );
    kv.delete("employees").unwrap();
    kv.delete("employees").unwrap();
    assert_eq!(kv.get("employees").unwrap(), None);
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteKeyValueStore::try_new(&conn).err().expect("must fail");
    assert!(matches!(
        err,
        KvError::Db(DbError::SchemaNotMigrated { found: 0, .. })
    ));
}

#[test]
fn store_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");
    let gate = PresetGate::granted();

    {
        let conn = open_db(&path).unwrap();
        let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
        let mut store = AttendanceStore::open(kv, &gate, StoreConfig::default());
        store.register_employee("Jane Smith", "E1").unwrap();
        store.check_in("E1", "Standup").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    assert!(kv.get(ATTENDANCE_KEY).unwrap().is_some());
    let store = AttendanceStore::open(kv, &gate, StoreConfig::default());
    assert_eq!(store.employees().len(), 1);
    assert_eq!(store.open_sessions().len(), 1);
}

#[test]
fn newer_database_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::NewerSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}
