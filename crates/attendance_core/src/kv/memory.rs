//! In-process key-value store with read and write failpoints.

use super::{KeyValueStore, KvError, KvResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Map-backed store for hosts without secure storage and for tests.
///
/// Keys registered with [`MemoryKeyValueStore::fail_writes_to`] reject
/// `set` and `delete`, and keys registered with
/// [`MemoryKeyValueStore::fail_reads_from`] reject `get`, until
/// [`MemoryKeyValueStore::clear_failpoints`].
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<BTreeMap<String, String>>,
    failpoints: RefCell<BTreeSet<String>>,
    read_failpoints: RefCell<BTreeSet<String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one raw value, bypassing failpoints.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failpoints.borrow_mut().insert(key.to_string());
    }

    pub fn fail_reads_from(&self, key: &str) {
        self.read_failpoints.borrow_mut().insert(key.to_string());
    }

    pub fn clear_failpoints(&self) {
        self.failpoints.borrow_mut().clear();
        self.read_failpoints.borrow_mut().clear();
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn check_failpoint(&self, key: &str) -> KvResult<()> {
        if self.failpoints.borrow().contains(key) {
            return Err(KvError::WriteRejected {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        if self.read_failpoints.borrow().contains(key) {
            return Err(KvError::ReadRejected {
                key: key.to_string(),
            });
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.check_failpoint(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.check_failpoint(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::kv::{KeyValueStore, KvError};

    #[test]
    fn failpoint_rejects_writes_but_not_reads() {
        let store = MemoryKeyValueStore::new().with_entry("employees", "[]");
        store.fail_writes_to("employees");

        let err = store.set("employees", "{}").unwrap_err();
        assert!(matches!(err, KvError::WriteRejected { ref key } if key == "employees"));
        assert_eq!(store.get("employees").unwrap().as_deref(), Some("[]"));

        store.clear_failpoints();
        store.delete("employees").unwrap();
        assert!(!store.contains_key("employees"));
    }

    #[test]
    fn read_failpoint_hides_value_until_cleared() {
        let store = MemoryKeyValueStore::new().with_entry("attendance", "[]");
        store.fail_reads_from("attendance");

        let err = store.get("attendance").unwrap_err();
        assert!(matches!(err, KvError::ReadRejected { ref key } if key == "attendance"));
        assert!(store.contains_key("attendance"));

        store.clear_failpoints();
        assert_eq!(store.get("attendance").unwrap().as_deref(), Some("[]"));
    }
}
