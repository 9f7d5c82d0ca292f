//! Schema creation.

use crate::error::Result;
use rusqlite::Connection;

/// Creates all tables and indices if they don't exist.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS file (
             id INTEGER PRIMARY KEY,
             directory TEXT NOT NULL,
             name TEXT NOT NULL,
             fingerprint TEXT NOT NULL,
             mod_time DATETIME NOT NULL,
             size INTEGER NOT NULL,
             is_dir BOOLEAN NOT NULL,
             CONSTRAINT con_file_path UNIQUE (directory, name)
         );
         CREATE INDEX IF NOT EXISTS idx_file_fingerprint
             ON file (fingerprint);

         CREATE TABLE IF NOT EXISTS tag (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL UNIQUE
         );

         CREATE TABLE IF NOT EXISTS value (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL UNIQUE
         );

         CREATE TABLE IF NOT EXISTS file_tag (
             file_id INTEGER NOT NULL,
             tag_id INTEGER NOT NULL,
             value_id INTEGER NOT NULL,
             PRIMARY KEY (file_id, tag_id, value_id)
         );
         CREATE INDEX IF NOT EXISTS idx_file_tag_tag_id
             ON file_tag (tag_id);

         CREATE TABLE IF NOT EXISTS implication (
             tag_id INTEGER NOT NULL,
             implied_tag_id INTEGER NOT NULL,
             PRIMARY KEY (tag_id, implied_tag_id)
         );

         CREATE TABLE IF NOT EXISTS setting (
             name TEXT PRIMARY KEY,
             value TEXT NOT NULL
         );",
    )?;

    Ok(())
}
