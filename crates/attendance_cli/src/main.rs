//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `attendance_core` linkage without the Flutter runtime.
//! - Optionally summarize an on-disk attendance database. Loading discards
//!   corrupt values the same way the app does.

use attendance_core::db::open_db;
use attendance_core::{
    AttendanceStore, CollectionLoad, PresetGate, SqliteKeyValueStore, StoreConfig,
    SNAPSHOT_VERSION,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("attendance_core ping={}", attendance_core::ping());
    println!("attendance_core version={}", attendance_core::core_version());
    println!("attendance_core snapshot_version={SNAPSHOT_VERSION}");

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let kv = match SqliteKeyValueStore::try_new(&conn) {
        Ok(kv) => kv,
        Err(err) => {
            eprintln!("failed to bind storage: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut store = AttendanceStore::new(kv, PresetGate::denied(), StoreConfig::default());
    let report = store.load();
    println!("employees load={}", describe(&report.employees));
    println!("attendance load={}", describe(&report.attendance));
    println!("employees={}", store.employees().len());
    println!("records={}", store.records().len());
    println!("open_sessions={}", store.open_sessions().len());
    println!("events={}", store.event_ids().join(","));
    ExitCode::SUCCESS
}

fn describe(load: &CollectionLoad) -> String {
    match load {
        CollectionLoad::Missing => "missing".to_string(),
        CollectionLoad::Loaded {
            count,
            source_version,
        } => format!("ok count={count} version={source_version}"),
        CollectionLoad::Discarded { reason } => format!("discarded ({reason})"),
        CollectionLoad::Unsupported { found } => format!("unsupported version={found}"),
        CollectionLoad::ReadFailed { reason } => format!("read_failed ({reason})"),
    }
}
