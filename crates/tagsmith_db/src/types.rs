//! Entity types stored in the database.
//!
//! Components outside the store hold only ids and re-fetch rows on
//! demand; none of these types carry live references into storage.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub type FileId = i64;
pub type TagId = i64;
pub type ValueId = i64;

/// Id of the reserved "no value" sentinel. The sentinel is never
/// stored; `value_id = 0` on a file-tag row means the tag was applied
/// without a value.
pub const NO_VALUE_ID: ValueId = 0;

/// A known file. The absolute path is stored split into `directory`
/// and `name`, unique as a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub id: FileId,
    pub directory: String,
    pub name: String,
    pub fingerprint: String,
    pub mod_time: DateTime<Utc>,
    pub size: i64,
    pub is_dir: bool,
}

impl File {
    /// The full absolute path.
    pub fn path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub id: ValueId,
    pub name: String,
}

impl Value {
    /// The reserved "no value" sentinel.
    pub fn sentinel() -> Value {
        Value { id: NO_VALUE_ID, name: String::new() }
    }
}

/// A (file, tag, value) association row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTag {
    pub file_id: FileId,
    pub tag_id: TagId,
    pub value_id: ValueId,
}

/// A direct "having `tag_id` implies having `implied_tag_id`" row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Implication {
    pub tag_id: TagId,
    pub implied_tag_id: TagId,
}

/// Splits an absolute path into the `(directory, name)` pair used by
/// the file table. The root directory itself has an empty name.
pub fn split_path(path: &Path) -> (String, String) {
    let directory = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (directory, name)
}
