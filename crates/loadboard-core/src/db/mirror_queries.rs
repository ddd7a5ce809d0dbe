//! Key/value queries on the mirror table.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{DatabaseResultExt, Result};

const SELECT_VALUE_SQL: &str = "SELECT value FROM mirror WHERE key = ?1";
const SELECT_UPDATED_AT_SQL: &str = "SELECT updated_at FROM mirror WHERE key = ?1";
const UPSERT_VALUE_SQL: &str = "INSERT INTO mirror (key, value, updated_at) VALUES (?1, ?2, ?3) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
const DELETE_KEY_SQL: &str = "DELETE FROM mirror WHERE key = ?1";
const DELETE_ALL_SQL: &str = "DELETE FROM mirror";

impl super::Database {
    /// Reads the list stored under `key`. A missing key reads as empty.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let raw: Option<String> = self
            .connection
            .query_row(SELECT_VALUE_SQL, params![key], |row| row.get(0))
            .optional()
            .db_context("Failed to read mirror entry")?;

        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the list stored under `key`.
    pub fn put_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.connection
            .execute(
                UPSERT_VALUE_SQL,
                params![key, raw, Timestamp::now().to_string()],
            )
            .db_context("Failed to write mirror entry")?;
        Ok(())
    }

    /// Replaces several lists atomically.
    pub fn put_lists(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        let now = Timestamp::now().to_string();
        for (key, raw) in entries {
            tx.execute(UPSERT_VALUE_SQL, params![key, raw, &now])
                .db_context("Failed to write mirror entry")?;
        }
        tx.commit().db_context("Failed to commit transaction")
    }

    /// When `key` was last written, if ever.
    pub fn updated_at(&self, key: &str) -> Result<Option<Timestamp>> {
        self.connection
            .query_row(SELECT_UPDATED_AT_SQL, params![key], |row| {
                row.get::<_, String>(0)?
                    .parse::<Timestamp>()
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
            })
            .optional()
            .db_context("Failed to read mirror timestamp")
    }

    /// Drops the entry for `key`. Returns whether anything was stored.
    pub fn delete_key(&mut self, key: &str) -> Result<bool> {
        let removed = self
            .connection
            .execute(DELETE_KEY_SQL, params![key])
            .db_context("Failed to delete mirror entry")?;
        Ok(removed > 0)
    }

    /// Drops every entry.
    pub fn delete_all(&mut self) -> Result<usize> {
        self.connection
            .execute(DELETE_ALL_SQL, [])
            .db_context("Failed to clear mirror")
    }

    /// Removes list items for which `keep` is false, in one transaction.
    /// Returns how many items were removed.
    pub fn retain_in_list<T, F>(&mut self, key: &str, keep: F) -> Result<usize>
    where
        T: DeserializeOwned + Serialize,
        F: Fn(&T) -> bool,
    {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let raw: Option<String> = tx
            .query_row(SELECT_VALUE_SQL, params![key], |row| row.get(0))
            .optional()
            .db_context("Failed to read mirror entry")?;
        let Some(raw) = raw else {
            return Ok(0);
        };

        let items: Vec<T> = serde_json::from_str(&raw)?;
        let before = items.len();
        let kept: Vec<T> = items.into_iter().filter(|item| keep(item)).collect();
        let removed = before - kept.len();

        if removed > 0 {
            tx.execute(
                UPSERT_VALUE_SQL,
                params![key, serde_json::to_string(&kept)?, Timestamp::now().to_string()],
            )
            .db_context("Failed to write mirror entry")?;
        }
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::Database;

    fn open() -> (TempDir, Database) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::new(dir.path().join("mirror.db")).expect("Failed to open database");
        (dir, db)
    }

    #[test]
    fn test_missing_key_reads_empty() {
        let (_dir, db) = open();
        let items: Vec<String> = db.get_list("orders").unwrap();
        assert!(items.is_empty());
        assert!(db.updated_at("orders").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let (_dir, mut db) = open();
        db.put_list("drivers", &["a", "b"]).unwrap();
        db.put_list("drivers", &["c"]).unwrap();
        let items: Vec<String> = db.get_list("drivers").unwrap();
        assert_eq!(items, vec!["c"]);
        assert!(db.updated_at("drivers").unwrap().is_some());
    }

    #[test]
    fn test_retain_and_delete() {
        let (_dir, mut db) = open();
        db.put_list("orders", &[1, 2, 3, 4]).unwrap();
        let removed = db.retain_in_list::<i32, _>("orders", |n| n % 2 == 0).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(db.get_list::<i32>("orders").unwrap(), vec![2, 4]);

        assert!(db.delete_key("orders").unwrap());
        assert!(!db.delete_key("orders").unwrap());
        assert_eq!(db.retain_in_list::<i32, _>("orders", |_| true).unwrap(), 0);
    }

    #[test]
    fn test_schema_version_recorded() {
        let (_dir, db) = open();
        assert_eq!(db.schema_version().unwrap(), super::super::migrations::SCHEMA_VERSION);
    }
}
