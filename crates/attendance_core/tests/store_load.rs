use attendance_core::{
    AttendanceStatus, AttendanceStore, CollectionLoad, KeyValueStore, MemoryKeyValueStore,
    PresetGate, StoreConfig, StoreError, ATTENDANCE_KEY, EMPLOYEES_KEY, SNAPSHOT_VERSION,
};

const LEGACY_ROSTER: &str = r#"[
    {"id":"emp-1","name":"Jane Smith","employeeId":"E1"},
    {"id":"emp-2","name":"John Doe","employeeId":"E2"}
]"#;

#[test]
fn corrupted_attendance_is_discarded_independently() {
    let kv = MemoryKeyValueStore::new()
        .with_entry(EMPLOYEES_KEY, LEGACY_ROSTER)
        .with_entry(ATTENDANCE_KEY, "{\"version\":1,\"items\":[oops");
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::new(&kv, &gate, StoreConfig::default());

    let report = store.load();
    assert_eq!(
        report.employees,
        CollectionLoad::Loaded {
            count: 2,
            source_version: 0
        }
    );
    assert!(matches!(report.attendance, CollectionLoad::Discarded { .. }));
    assert_eq!(store.employees().len(), 2);
    assert!(store.records().is_empty());
    assert!(!kv.contains_key(ATTENDANCE_KEY));
}

#[test]
fn discarded_roster_is_rewritten_in_versioned_layout() {
    let kv = MemoryKeyValueStore::new()
        .with_entry(EMPLOYEES_KEY, "not json")
        .with_entry(ATTENDANCE_KEY, "[]");
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::open(&kv, &gate, StoreConfig::default());
    assert!(store.employees().is_empty());
    assert!(!kv.contains_key(EMPLOYEES_KEY));
    assert!(kv.contains_key(ATTENDANCE_KEY));

    store.register_employee("Ana", "E1").unwrap();
    let raw = kv.get(EMPLOYEES_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], SNAPSHOT_VERSION);
}

#[test]
fn missing_keys_load_as_empty() {
    let kv = MemoryKeyValueStore::new();
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::new(&kv, &gate, StoreConfig::default());
    let report = store.load();
    assert_eq!(report.employees, CollectionLoad::Missing);
    assert_eq!(report.attendance, CollectionLoad::Missing);
    assert_eq!(report.duplicate_employees_dropped, 0);
}

#[test]
fn newer_snapshot_is_kept_and_protected() {
    let future = r#"{"version":99,"items":[{"shape":"unknown"}]}"#;
    let kv = MemoryKeyValueStore::new().with_entry(EMPLOYEES_KEY, future);
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::new(&kv, &gate, StoreConfig::default());

    let report = store.load();
    assert_eq!(report.employees, CollectionLoad::Unsupported { found: 99 });
    assert!(store.employees().is_empty());

    let err = store.register_employee("Ana", "E1").unwrap_err();
    assert!(matches!(
        err,
        StoreError::CollectionUnavailable { key } if key == EMPLOYEES_KEY
    ));
    assert_eq!(gate.prompt_count(), 0);
    assert_eq!(kv.get(EMPLOYEES_KEY).unwrap().as_deref(), Some(future));
}

#[test]
fn duplicate_codes_in_stored_roster_keep_first_entry() {
    let roster = r#"[
        {"id":"emp-1","name":"Jane Smith","employeeId":"E1"},
        {"id":"emp-2","name":"Impostor","employeeId":"E1"}
    ]"#;
    let kv = MemoryKeyValueStore::new().with_entry(EMPLOYEES_KEY, roster);
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::new(&kv, &gate, StoreConfig::default());

    let report = store.load();
    assert_eq!(report.duplicate_employees_dropped, 1);
    assert_eq!(store.employees().len(), 1);
    assert_eq!(store.employees()[0].id, "emp-1");
}

#[test]
fn versioned_round_trip_preserves_records() {
    let kv = MemoryKeyValueStore::new();
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::open(&kv, &gate, StoreConfig::default());
    store.register_employee("Jane Smith", "E1").unwrap();
    store.check_in("E1", "Standup").unwrap();
    store.check_out("E1", "Standup").unwrap();

    let mut reopened = AttendanceStore::new(&kv, &gate, StoreConfig::default());
    let report = reopened.load();
    assert_eq!(
        report.attendance,
        CollectionLoad::Loaded {
            count: 1,
            source_version: SNAPSHOT_VERSION
        }
    );
    assert_eq!(reopened.records(), store.records());
}

#[test]
fn legacy_padded_codes_are_trimmed_on_load() {
    let roster = r#"[
        {"id":"emp-1","name":" Jane Smith","employeeId":"E1 "},
        {"id":"emp-2","name":"Copy","employeeId":" E1"}
    ]"#;
    let log = r#"[
        {"id":"att-1","employeeId":"E1 ","employeeName":" Jane Smith","eventId":"Standup ","timestamp":"2025-05-15T09:00:00.000Z","status":"Checked In"}
    ]"#;
    let kv = MemoryKeyValueStore::new()
        .with_entry(EMPLOYEES_KEY, roster)
        .with_entry(ATTENDANCE_KEY, log);
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::new(&kv, &gate, StoreConfig::default());

    let report = store.load();
    assert_eq!(report.duplicate_employees_dropped, 1);
    assert_eq!(store.employees()[0].employee_id, "E1");
    assert_eq!(store.employees()[0].name, "Jane Smith");
    assert_eq!(store.records()[0].event_id, "Standup");

    let err = store.register_employee("Impostor", "E1").unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmployeeId(ref code) if code == "E1"));

    let closed = store.check_out("E1 ", "Standup").unwrap();
    assert_eq!(closed.id, "att-1");
    assert_eq!(closed.status, AttendanceStatus::CheckedOut);
    let opened = store.check_in("E1", "Standup").unwrap();
    assert_eq!(opened.employee_name, "Jane Smith");
    assert_eq!(store.employees().len(), 1);
}

#[test]
fn versioned_values_are_loaded_as_written() {
    let raw = r#"{"version":1,"items":[{"id":"emp-1","name":"Jane","employeeId":"E1 "}]}"#;
    let kv = MemoryKeyValueStore::new().with_entry(EMPLOYEES_KEY, raw);
    let gate = PresetGate::granted();
    let store = AttendanceStore::open(&kv, &gate, StoreConfig::default());
    assert_eq!(store.employees()[0].employee_id, "E1 ");
}

#[test]
fn unreadable_attendance_is_kept_and_protected() {
    let log = r#"{"version":1,"items":[]}"#;
    let kv = MemoryKeyValueStore::new()
        .with_entry(EMPLOYEES_KEY, LEGACY_ROSTER)
        .with_entry(ATTENDANCE_KEY, log);
    kv.fail_reads_from(ATTENDANCE_KEY);
    let gate = PresetGate::granted();
    let mut store = AttendanceStore::new(&kv, &gate, StoreConfig::default());

    let report = store.load();
    assert!(matches!(report.attendance, CollectionLoad::ReadFailed { .. }));
    assert_eq!(store.employees().len(), 2);
    assert!(kv.contains_key(ATTENDANCE_KEY));

    let err = store.check_in("E1", "Standup").unwrap_err();
    assert!(matches!(
        err,
        StoreError::CollectionUnavailable { key } if key == ATTENDANCE_KEY
    ));
    assert_eq!(gate.prompt_count(), 0);

    kv.clear_failpoints();
    assert_eq!(kv.get(ATTENDANCE_KEY).unwrap().as_deref(), Some(log));
}
