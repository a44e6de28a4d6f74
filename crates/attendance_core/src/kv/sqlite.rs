//! SQLite-backed key-value store over the `kv_entries` table.

use super::{KeyValueStore, KvResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store bound to one migrated connection.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Binds to `conn` after checking the schema is fully migrated.
    pub fn try_new(conn: &'conn Connection) -> KvResult<Self> {
        let version = current_user_version(conn)?;
        let latest = latest_version();
        if version > latest {
            return Err(DbError::NewerSchema {
                found: version,
                supported: latest,
            }
            .into());
        }
        if version < latest {
            return Err(DbError::SchemaNotMigrated {
                found: version,
                expected: latest,
            }
            .into());
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
