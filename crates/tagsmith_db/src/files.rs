//! File operations.

use crate::error::{duplicate_on_conflict, Result, StoreError};
use crate::types::{split_path, File, FileId};
use crate::Store;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use std::path::Path;

/// Parameter-limit-safe batch size for `IN (...)` queries.
const ID_BATCH: usize = 500;

const FILE_COLUMNS: &str = "id, directory, name, fingerprint, mod_time, size, is_dir";

fn read_file(row: &Row<'_>) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        directory: row.get(1)?,
        name: row.get(2)?,
        fingerprint: row.get(3)?,
        mod_time: row.get(4)?,
        size: row.get(5)?,
        is_dir: row.get(6)?,
    })
}

fn sort_by_path(files: &mut [File]) {
    files.sort_by_key(|f| f.path().into_os_string());
}

impl Store {
    /// Creates a file row. Fails with `Duplicate` when the path is
    /// already known.
    pub fn add_file(
        &self,
        path: &Path,
        fingerprint: &str,
        mod_time: DateTime<Utc>,
        size: i64,
        is_dir: bool,
    ) -> Result<File> {
        let (directory, name) = split_path(path);

        self.conn()
            .execute(
                "INSERT INTO file (directory, name, fingerprint, mod_time, size, is_dir)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![directory, name, fingerprint, mod_time, size, is_dir],
            )
            .map_err(|err| {
                duplicate_on_conflict(err, "file", &path.display().to_string())
            })?;

        Ok(File {
            id: self.conn().last_insert_rowid(),
            directory,
            name,
            fingerprint: fingerprint.to_string(),
            mod_time,
            size,
            is_dir,
        })
    }

    /// Refreshes the stat-derived columns of an existing row. The id
    /// never changes once assigned.
    pub fn update_file(
        &self,
        id: FileId,
        fingerprint: &str,
        mod_time: DateTime<Utc>,
        size: i64,
        is_dir: bool,
    ) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE file SET fingerprint = ?2, mod_time = ?3, size = ?4, is_dir = ?5
             WHERE id = ?1",
            params![id, fingerprint, mod_time, size, is_dir],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found("file", id.to_string()));
        }
        Ok(())
    }

    /// Exact match on the stored path.
    pub fn file_by_path(&self, path: &Path) -> Result<Option<File>> {
        let (directory, name) = split_path(path);
        let file = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {FILE_COLUMNS} FROM file WHERE directory = ?1 AND name = ?2"
                ),
                params![directory, name],
                read_file,
            )
            .optional()?;
        Ok(file)
    }

    pub fn file_by_id(&self, id: FileId) -> Result<Option<File>> {
        let file = self
            .conn()
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM file WHERE id = ?1"),
                [id],
                read_file,
            )
            .optional()?;
        Ok(file)
    }

    /// All files, ordered by full path ascending.
    pub fn files(&self) -> Result<Vec<File>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {FILE_COLUMNS} FROM file"))?;
        let mut files = stmt
            .query_map([], read_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        sort_by_path(&mut files);
        Ok(files)
    }

    /// Fetches the given file rows, ordered by full path ascending.
    pub fn files_by_ids<I>(&self, ids: I) -> Result<Vec<File>>
    where
        I: IntoIterator<Item = FileId>,
    {
        let ids: Vec<FileId> = ids.into_iter().collect();
        let mut files = Vec::with_capacity(ids.len());

        for batch in ids.chunks(ID_BATCH) {
            let placeholders = vec!["?"; batch.len()].join(",");
            let mut stmt = self.conn().prepare(&format!(
                "SELECT {FILE_COLUMNS} FROM file WHERE id IN ({placeholders})"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(batch.iter()), read_file)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            files.extend(rows);
        }

        sort_by_path(&mut files);
        Ok(files)
    }

    /// Files sharing a content fingerprint, for duplicate reporting.
    pub fn files_by_fingerprint(&self, fingerprint: &str) -> Result<Vec<File>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM file WHERE fingerprint = ?1"
        ))?;
        let mut files = stmt
            .query_map([fingerprint], read_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        sort_by_path(&mut files);
        Ok(files)
    }

    /// Deletes file rows no file-tag refers to.
    pub fn delete_untagged_files(&self) -> Result<usize> {
        let affected = self.conn().execute(
            "DELETE FROM file
             WHERE id NOT IN (SELECT DISTINCT file_id FROM file_tag)",
            [],
        )?;
        Ok(affected)
    }
}
