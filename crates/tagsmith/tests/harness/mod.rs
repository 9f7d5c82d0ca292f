#![allow(dead_code)] // not every test file uses every helper

//! Shared helpers for the command integration tests.
//!
//! Commands are driven through their public `run` functions with
//! in-memory output sinks, a throwaway database and (where needed)
//! real files under a temporary directory.

use chrono::Utc;
use std::path::Path;
use tagsmith::cli::files::{self, FilesArgs};
use tagsmith_db::{File, Store};
use tempfile::TempDir;

pub fn test_store() -> (TempDir, Store) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("test.db")).unwrap();
    (dir, store)
}

/// Adds a file row directly, the way the tag pipeline would.
pub fn add_file(store: &Store, path: &str, is_dir: bool) -> File {
    store
        .add_file(Path::new(path), "abc", Utc::now(), 123, is_dir)
        .unwrap()
}

/// Runs `files QUERY...` and returns captured stdout.
pub fn files_stdout(store: &Store, query: &[&str]) -> String {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let args = FilesArgs {
        query: query.iter().map(|s| s.to_string()).collect(),
        ..FilesArgs::default()
    };
    files::run(store, args, &mut out, &mut err).unwrap();
    String::from_utf8(out).unwrap()
}

/// Runs `files` with full argument control and returns captured
/// stdout.
pub fn files_stdout_with(store: &Store, args: FilesArgs) -> String {
    let mut out = Vec::new();
    let mut err = Vec::new();
    files::run(store, args, &mut out, &mut err).unwrap();
    String::from_utf8(out).unwrap()
}
