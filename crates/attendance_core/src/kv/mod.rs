//! Key-value storage contract used for the persisted collections.
//!
//! # Responsibility
//! - Model the device's opaque string store (`get`/`set`/`delete`).
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Every call is fallible; callers decide rollback policy.
//! - `delete` of a missing key is not an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

/// Storage failure surfaced as a persistence error.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// The backend refused a write for `key`.
    WriteRejected { key: String },
    /// The backend could not produce the value stored under `key`.
    ReadRejected { key: String },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WriteRejected { key } => write!(f, "storage rejected write for key `{key}`"),
            Self::ReadRejected { key } => write!(f, "storage could not read key `{key}`"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Device key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
    fn delete(&self, key: &str) -> KvResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        (**self).delete(key)
    }
}
