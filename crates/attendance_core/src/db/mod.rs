//! SQLite file that backs [`crate::kv::SqliteKeyValueStore`].
//!
//! The schema is one `kv_entries` table; roster and attendance blobs live
//! in it as opaque strings. `PRAGMA user_version` records the applied
//! migration.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// File was written by a newer build; nothing is migrated or read.
    NewerSchema { found: u32, supported: u32 },
    /// Connection was handed to the key-value store before migrating.
    SchemaNotMigrated { found: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "attendance database is at schema {found}, this build reads up to {supported}"
            ),
            Self::SchemaNotMigrated { found, expected } => write!(
                f,
                "attendance database is at schema {found}; open it with `open_db` to reach {expected}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
