//! Roster and attendance-log store.
//!
//! # Responsibility
//! - Own the in-memory roster and log for one session.
//! - Validate commands, consult the biometric gate, and write through to
//!   the key-value store.
//!
//! # Invariants
//! - No two roster entries share `employee_id`.
//! - In-memory state changes only after every affected key is written.
//! - Keys that could not be read safely at load are never overwritten.
//! - Queries are pure and never touch storage.

use crate::config::{DuplicateCheckInPolicy, EnrollmentPolicy, StoreConfig};
use crate::gate::{BiometricGate, PromptOutcome};
use crate::kv::KeyValueStore;
use crate::model::employee::{Employee, EmployeeInput};
use crate::model::record::AttendanceRecord;
use crate::model::validation::normalize_event_id;
use crate::persist::snapshot::{decode_snapshot, encode_snapshot, SnapshotError, SnapshotItem};
use crate::persist::{ATTENDANCE_KEY, EMPLOYEES_KEY};
use crate::service::record_filter::{distinct_event_ids, filter_records, EventFilter};
use crate::service::store_error::{AuthFailure, StoreError, StoreResult};
use chrono::Utc;
use log::{error, info, warn};
use std::collections::HashSet;

/// Outcome of loading one persisted collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionLoad {
    /// Key absent; collection starts empty.
    Missing,
    Loaded { count: usize, source_version: u32 },
    /// Value was unparsable and its key was deleted.
    Discarded { reason: String },
    /// Written by a newer build; key kept and locked against writes.
    Unsupported { found: u64 },
    /// Storage read failed; key kept and locked against writes.
    ReadFailed { reason: String },
}

impl CollectionLoad {
    fn locks_key(&self) -> bool {
        matches!(self, Self::Unsupported { .. } | Self::ReadFailed { .. })
    }
}

/// Per-key load outcomes returned by [`AttendanceStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub employees: CollectionLoad,
    pub attendance: CollectionLoad,
    /// Roster entries dropped because an earlier entry had the same code.
    pub duplicate_employees_dropped: usize,
}

/// Employee removed by [`AttendanceStore::delete_employee`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEmployee {
    pub employee: Employee,
    pub removed_records: usize,
}

struct Pending {
    employees: Option<Vec<Employee>>,
    records: Option<Vec<AttendanceRecord>>,
}

/// Single owner of the roster and attendance log.
pub struct AttendanceStore<K: KeyValueStore, G: BiometricGate> {
    kv: K,
    gate: G,
    config: StoreConfig,
    employees: Vec<Employee>,
    records: Vec<AttendanceRecord>,
    locked_keys: Vec<&'static str>,
}

impl<K: KeyValueStore, G: BiometricGate> AttendanceStore<K, G> {
    /// Creates an empty store; call [`Self::load`] before issuing commands.
    pub fn new(kv: K, gate: G, config: StoreConfig) -> Self {
        Self {
            kv,
            gate,
            config,
            employees: Vec::new(),
            records: Vec::new(),
            locked_keys: Vec::new(),
        }
    }

    /// Creates a store and loads both collections from `kv`.
    pub fn open(kv: K, gate: G, config: StoreConfig) -> Self {
        let mut store = Self::new(kv, gate, config);
        store.load();
        store
    }

    /// Reloads both collections, replacing in-memory state.
    ///
    /// Never fails: each key falls back to an empty collection on its own.
    pub fn load(&mut self) -> LoadReport {
        let (employees, employees_load) = load_collection::<Employee, _>(&self.kv, EMPLOYEES_KEY);
        let (records, attendance_load) =
            load_collection::<AttendanceRecord, _>(&self.kv, ATTENDANCE_KEY);
        let (employees, duplicate_employees_dropped) = dedupe_roster(employees);

        self.locked_keys.clear();
        if employees_load.locks_key() {
            self.locked_keys.push(EMPLOYEES_KEY);
        }
        if attendance_load.locks_key() {
            self.locked_keys.push(ATTENDANCE_KEY);
        }
        self.employees = employees;
        self.records = records;

        info!(
            "event=store_load module=store status=ok employees={} records={} duplicates_dropped={} locked_keys={}",
            self.employees.len(),
            self.records.len(),
            duplicate_employees_dropped,
            self.locked_keys.len()
        );

        LoadReport {
            employees: employees_load,
            attendance: attendance_load,
            duplicate_employees_dropped,
        }
    }

    /// Registers a new employee behind the registration prompt.
    ///
    /// # Errors
    /// - `Validation` for blank name or code.
    /// - `DuplicateEmployeeId` when the code is taken.
    /// - `Authentication` when the gate denies, fails, or cannot issue a
    ///   credential under `PerEmployeeCredential`.
    /// - `Persistence` when the roster write fails; the roster is unchanged.
    pub fn register_employee(&mut self, name: &str, employee_id: &str) -> StoreResult<Employee> {
        let input = EmployeeInput::parse(name, employee_id)?;
        if self.find_employee_by_code(&input.employee_id).is_some() {
            return Err(StoreError::DuplicateEmployeeId(input.employee_id));
        }
        self.ensure_writable(EMPLOYEES_KEY)?;

        self.authenticate(&self.config.prompts.register)?;
        let biometric_key_ref = match self.config.enrollment {
            EnrollmentPolicy::PresenceOnly => None,
            EnrollmentPolicy::PerEmployeeCredential => {
                let label = format!("{} ({})", input.name, input.employee_id);
                let key_ref = self.gate.create_credential(&label).map_err(|err| {
                    warn!("event=register_employee module=store status=error error_code=credential_failed");
                    StoreError::Authentication(AuthFailure::Gate(err))
                })?;
                Some(key_ref)
            }
        };

        let employee = Employee::new(input, biometric_key_ref);
        let mut employees = self.employees.clone();
        employees.push(employee.clone());
        self.commit(Pending {
            employees: Some(employees),
            records: None,
        })?;

        info!(
            "event=register_employee module=store status=ok enrolled={} roster_size={}",
            employee.is_enrolled(),
            self.employees.len()
        );
        Ok(employee)
    }

    /// Renames or re-codes an employee and repairs their records' copies.
    pub fn edit_employee(
        &mut self,
        id: &str,
        new_name: &str,
        new_employee_id: &str,
    ) -> StoreResult<Employee> {
        let input = EmployeeInput::parse(new_name, new_employee_id)?;
        let index = self.employee_index(id)?;
        let taken = self
            .employees
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && other.employee_id == input.employee_id);
        if taken {
            return Err(StoreError::DuplicateEmployeeId(input.employee_id));
        }
        self.ensure_writable(EMPLOYEES_KEY)?;
        self.ensure_writable(ATTENDANCE_KEY)?;

        let previous_code = self.employees[index].employee_id.clone();
        let mut employees = self.employees.clone();
        employees[index].apply(input);
        let updated = employees[index].clone();

        let mut records = self.records.clone();
        let mut rewritten = 0usize;
        for record in records
            .iter_mut()
            .filter(|record| record.employee_id == previous_code)
        {
            record.employee_id = updated.employee_id.clone();
            record.employee_name = updated.name.clone();
            rewritten += 1;
        }

        self.commit(Pending {
            employees: Some(employees),
            records: Some(records),
        })?;
        info!("event=edit_employee module=store status=ok records_rewritten={rewritten}");
        Ok(updated)
    }

    /// Deletes an employee and every record carrying their code.
    pub fn delete_employee(&mut self, id: &str) -> StoreResult<RemovedEmployee> {
        let index = self.employee_index(id)?;
        self.ensure_writable(EMPLOYEES_KEY)?;
        self.ensure_writable(ATTENDANCE_KEY)?;

        let mut employees = self.employees.clone();
        let employee = employees.remove(index);
        let records: Vec<AttendanceRecord> = self
            .records
            .iter()
            .filter(|record| record.employee_id != employee.employee_id)
            .cloned()
            .collect();
        let removed_records = self.records.len() - records.len();

        self.commit(Pending {
            employees: Some(employees),
            records: Some(records),
        })?;
        info!("event=delete_employee module=store status=ok records_removed={removed_records}");
        Ok(RemovedEmployee {
            employee,
            removed_records,
        })
    }

    /// Opens an attendance session behind the attendance prompt.
    ///
    /// Existence, enrollment and duplicate-session checks run before the
    /// gate is consulted.
    pub fn check_in(&mut self, employee_id: &str, event_id: &str) -> StoreResult<AttendanceRecord> {
        let event_id = normalize_event_id(event_id)?;
        let code = employee_id.trim();
        let employee = self
            .find_employee_by_code(code)
            .cloned()
            .ok_or_else(|| StoreError::EmployeeNotFound(code.to_string()))?;
        if self.config.enrollment == EnrollmentPolicy::PerEmployeeCredential
            && !employee.is_enrolled()
        {
            return Err(StoreError::NotEnrolled(employee.employee_id));
        }
        let has_open_session = self
            .records
            .iter()
            .any(|record| record.is_open_session_for(&employee.employee_id, &event_id));
        if has_open_session && self.config.duplicate_check_in == DuplicateCheckInPolicy::Reject {
            return Err(StoreError::SessionAlreadyOpen {
                employee_id: employee.employee_id,
                event_id,
            });
        }
        self.ensure_writable(ATTENDANCE_KEY)?;

        self.authenticate(&self.config.prompts.attendance)?;

        let now = Utc::now();
        let mut records = self.records.clone();
        let mut closed = 0usize;
        for record in records
            .iter_mut()
            .filter(|record| record.is_open_session_for(&employee.employee_id, &event_id))
        {
            closed += usize::from(record.check_out(now).is_ok());
        }
        let record = AttendanceRecord::check_in(&employee, event_id, now);
        records.push(record.clone());

        self.commit(Pending {
            employees: None,
            records: Some(records),
        })?;
        info!("event=check_in module=store status=ok sessions_closed={closed}");
        Ok(record)
    }

    /// Closes the most recent open session for the employee/event pair.
    pub fn check_out(
        &mut self,
        employee_id: &str,
        event_id: &str,
    ) -> StoreResult<AttendanceRecord> {
        let event_id = normalize_event_id(event_id)?;
        let code = employee_id.trim();
        let no_open_session = || StoreError::NoOpenSession {
            employee_id: code.to_string(),
            event_id: event_id.clone(),
        };
        let index = self
            .records
            .iter()
            .rposition(|record| record.is_open_session_for(code, &event_id))
            .ok_or_else(no_open_session)?;
        self.ensure_writable(ATTENDANCE_KEY)?;

        let mut records = self.records.clone();
        if records[index].check_out(Utc::now()).is_err() {
            return Err(no_open_session());
        }
        let record = records[index].clone();

        self.commit(Pending {
            employees: None,
            records: Some(records),
        })?;
        info!("event=check_out module=store status=ok");
        Ok(record)
    }

    /// Removes one record from the log (admin action).
    pub fn delete_record(&mut self, record_id: &str) -> StoreResult<AttendanceRecord> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == record_id)
            .ok_or_else(|| StoreError::RecordNotFound(record_id.to_string()))?;
        self.ensure_writable(ATTENDANCE_KEY)?;

        let mut records = self.records.clone();
        let removed = records.remove(index);
        self.commit(Pending {
            employees: None,
            records: Some(records),
        })?;
        info!("event=delete_record module=store status=ok");
        Ok(removed)
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn find_employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    pub fn find_employee_by_code(&self, employee_id: &str) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|employee| employee.employee_id == employee_id)
    }

    /// Admin search; see [`filter_records`].
    pub fn filter(&self, query: &str, event: &EventFilter) -> Vec<&AttendanceRecord> {
        filter_records(&self.records, query, event)
    }

    /// Events present in the log, for the admin picker.
    pub fn event_ids(&self) -> Vec<String> {
        distinct_event_ids(&self.records)
    }

    pub fn open_sessions(&self) -> Vec<&AttendanceRecord> {
        self.records.iter().filter(|record| record.is_open()).collect()
    }

    fn authenticate(&self, message: &str) -> StoreResult<()> {
        let failure = match self.gate.prompt(message) {
            Ok(PromptOutcome::Granted) => return Ok(()),
            Ok(PromptOutcome::Denied) => AuthFailure::Denied,
            Err(err) => AuthFailure::Gate(err),
        };
        warn!("event=gate_prompt module=store status=denied");
        Err(StoreError::Authentication(failure))
    }

    fn employee_index(&self, id: &str) -> StoreResult<usize> {
        self.employees
            .iter()
            .position(|employee| employee.id == id)
            .ok_or_else(|| StoreError::EmployeeNotFound(id.to_string()))
    }

    fn ensure_writable(&self, key: &'static str) -> StoreResult<()> {
        if self.locked_keys.contains(&key) {
            return Err(StoreError::CollectionUnavailable { key });
        }
        Ok(())
    }

    /// Writes every pending collection, then swaps it into memory.
    ///
    /// When the attendance write fails after the roster write succeeded,
    /// the previous roster is written back before returning the error.
    fn commit(&mut self, pending: Pending) -> StoreResult<()> {
        let employees_blob = pending
            .employees
            .as_deref()
            .map(encode_snapshot::<Employee>)
            .transpose()?;
        let records_blob = pending
            .records
            .as_deref()
            .map(encode_snapshot::<AttendanceRecord>)
            .transpose()?;

        if let Some(blob) = &employees_blob {
            self.kv.set(EMPLOYEES_KEY, blob).map_err(|err| {
                error!("event=persist module=store status=error key={EMPLOYEES_KEY} error={err}");
                err
            })?;
        }
        if let Some(blob) = &records_blob {
            if let Err(err) = self.kv.set(ATTENDANCE_KEY, blob) {
                error!("event=persist module=store status=error key={ATTENDANCE_KEY} error={err}");
                if employees_blob.is_some() {
                    self.restore_employees();
                }
                return Err(err.into());
            }
        }

        if let Some(employees) = pending.employees {
            self.employees = employees;
        }
        if let Some(records) = pending.records {
            self.records = records;
        }
        Ok(())
    }

    fn restore_employees(&self) {
        let restored = encode_snapshot(&self.employees)
            .map_err(StoreError::from)
            .and_then(|blob| {
                self.kv
                    .set(EMPLOYEES_KEY, &blob)
                    .map_err(StoreError::from)
            });
        match restored {
            Ok(()) => warn!("event=rollback module=store status=ok key={EMPLOYEES_KEY}"),
            Err(err) => {
                error!("event=rollback module=store status=error key={EMPLOYEES_KEY} error={err}")
            }
        }
    }
}

fn load_collection<T: SnapshotItem, K: KeyValueStore>(
    kv: &K,
    key: &'static str,
) -> (Vec<T>, CollectionLoad) {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (Vec::new(), CollectionLoad::Missing),
        Err(err) => {
            warn!("event=store_load module=store status=error key={key} error_code=read_failed error={err}");
            return (
                Vec::new(),
                CollectionLoad::ReadFailed {
                    reason: err.to_string(),
                },
            );
        }
    };

    match decode_snapshot::<T>(&raw) {
        Ok(decoded) => {
            if decoded.was_migrated() {
                info!(
                    "event=snapshot_migrate module=store status=ok key={key} from_version={}",
                    decoded.source_version
                );
            }
            let load = CollectionLoad::Loaded {
                count: decoded.items.len(),
                source_version: decoded.source_version,
            };
            (decoded.items, load)
        }
        Err(err) if err.is_corrupt() => {
            warn!("event=store_load module=store status=discarded key={key} error={err}");
            if let Err(delete_err) = kv.delete(key) {
                error!("event=store_load module=store status=error key={key} error_code=discard_failed error={delete_err}");
            }
            (
                Vec::new(),
                CollectionLoad::Discarded {
                    reason: err.to_string(),
                },
            )
        }
        Err(SnapshotError::UnsupportedVersion { found, .. }) => {
            warn!("event=store_load module=store status=error key={key} error_code=unsupported_version found={found}");
            (Vec::new(), CollectionLoad::Unsupported { found })
        }
        Err(err) => {
            warn!("event=store_load module=store status=error key={key} error_code=decode_failed error={err}");
            (
                Vec::new(),
                CollectionLoad::ReadFailed {
                    reason: err.to_string(),
                },
            )
        }
    }
}

fn dedupe_roster(employees: Vec<Employee>) -> (Vec<Employee>, usize) {
    let mut seen = HashSet::new();
    let before = employees.len();
    let kept: Vec<Employee> = employees
        .into_iter()
        .filter(|employee| seen.insert(employee.employee_id.clone()))
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        warn!("event=store_load module=store status=warn duplicate_employees_dropped={dropped}");
    }
    (kept, dropped)
}
