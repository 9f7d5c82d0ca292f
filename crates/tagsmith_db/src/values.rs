//! Value operations.
//!
//! The empty name is the reserved "no value" sentinel with fixed id 0;
//! it is answered from code and never stored.

use crate::error::{duplicate_on_conflict, Result, StoreError};
use crate::types::{Value, ValueId, NO_VALUE_ID};
use crate::Store;
use rusqlite::OptionalExtension;

/// Value names may be any printable text, including whitespace; only
/// control characters are rejected. The empty string is the sentinel.
pub fn is_valid_value_name(name: &str) -> bool {
    name.chars().all(|c| !c.is_control())
}

impl Store {
    /// Creates a value. The empty name returns the sentinel without
    /// touching storage.
    pub fn add_value(&self, name: &str) -> Result<Value> {
        if name.is_empty() {
            return Ok(Value::sentinel());
        }
        if !is_valid_value_name(name) {
            return Err(StoreError::InvalidValueName(name.to_string()));
        }

        self.conn()
            .execute("INSERT INTO value (name) VALUES (?1)", [name])
            .map_err(|err| duplicate_on_conflict(err, "value", name))?;

        Ok(Value {
            id: self.conn().last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn value_by_name(&self, name: &str) -> Result<Option<Value>> {
        if name.is_empty() {
            return Ok(Some(Value::sentinel()));
        }

        let value = self
            .conn()
            .query_row(
                "SELECT id, name FROM value WHERE name = ?1",
                [name],
                |row| {
                    Ok(Value { id: row.get(0)?, name: row.get(1)? })
                },
            )
            .optional()?;
        Ok(value)
    }

    pub fn value_by_id(&self, id: ValueId) -> Result<Option<Value>> {
        if id == NO_VALUE_ID {
            return Ok(Some(Value::sentinel()));
        }

        let value = self
            .conn()
            .query_row("SELECT id, name FROM value WHERE id = ?1", [id], |row| {
                Ok(Value { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(value)
    }

    /// Deletes values no file-tag row refers to.
    pub fn delete_unused_values(&self) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM value
             WHERE id NOT IN (SELECT DISTINCT value_id FROM file_tag)",
            [],
        )?;
        Ok(affected)
    }
}
