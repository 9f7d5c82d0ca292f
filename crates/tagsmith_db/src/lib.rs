//! Entity store for tagsmith.
//!
//! One single-file SQLite database holds files, tags, values, the
//! file-tag association rows and tag implications. This crate is the
//! only place SQL lives; other crates hold entity ids and call the
//! typed methods here.
//!
//! Mutating commands open one [`Transaction`] for their whole run and
//! commit at the command boundary; an error (or an early return) rolls
//! the transaction back, leaving no partial tag-set behind. Calls made
//! outside a transaction are each their own implicit transaction.

mod closure;
mod compile;
mod error;
mod files;
mod filetags;
mod implications;
mod schema;
mod settings;
mod tags;
mod types;
mod values;

pub use compile::compare_values;
pub use error::{Result, StoreError};
pub use settings::{Settings, SETTING_NAMES};
pub use tags::is_valid_tag_name;
pub use types::{
    split_path, File, FileId, FileTag, Implication, Tag, TagId, Value, ValueId, NO_VALUE_ID,
};

use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

/// Handle to the tag database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path, creating parent
    /// directories and the schema as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn)?;

        debug!(path = %path.display(), "database opened");

        Ok(Store { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin the command-scoped transaction. The returned guard rolls
    /// back on drop unless [`Transaction::commit`] is called.
    pub fn begin(&self) -> Result<Transaction<'_>> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Transaction { store: self, finished: false })
    }
}

/// Guard for a command-scoped transaction.
pub struct Transaction<'a> {
    store: &'a Store,
    finished: bool,
}

impl Transaction<'_> {
    pub fn commit(mut self) -> Result<()> {
        self.store.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.store.conn.execute_batch("ROLLBACK");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Store;
    use tempfile::TempDir;

    /// A store backed by a throwaway database file.
    pub fn temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("test.db")).unwrap();
        (dir, store)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::temp_store;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database_and_directories() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("tags.db");

        let _store = Store::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let (_dir, store) = temp_store();

        {
            let _tx = store.begin().unwrap();
            store.add_tag("doomed").unwrap();
        }

        assert!(store.tag_by_name("doomed").unwrap().is_none());
    }

    #[test]
    fn committed_transaction_persists() {
        let (_dir, store) = temp_store();

        let tx = store.begin().unwrap();
        store.add_tag("kept").unwrap();
        tx.commit().unwrap();

        assert!(store.tag_by_name("kept").unwrap().is_some());
    }
}
