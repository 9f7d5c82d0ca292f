//! Files command - list files matching a tag query.
//!
//! Compiles the query (an empty query matches every file) and prints
//! the matching paths one per line, sorted ascending.

use crate::cli::{CommandError, CommandOutcome, CommandResult};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tagsmith_db::{File, Store};
use tagsmith_query::parse;

/// Result ordering for the files command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Sort {
    /// Full path, ascending.
    #[default]
    Name,
    /// File size, then path.
    Size,
    /// Modification time, then path.
    Time,
    /// Insertion order.
    None,
}

/// Arguments for the files command.
#[derive(Debug, Default)]
pub struct FilesArgs {
    pub query: Vec<String>,
    pub directory: bool,
    pub file: bool,
    pub top: bool,
    pub count: bool,
    pub print0: bool,
    pub explicit: bool,
    pub sort: Sort,
}

/// Execute the files command.
pub fn run(
    store: &Store,
    args: FilesArgs,
    out: &mut dyn Write,
    _err: &mut dyn Write,
) -> CommandResult {
    if args.directory && args.file {
        return Err(CommandError::usage(
            "cannot specify both --file and --directory",
        ));
    }

    let expr = parse(&args.query)?;
    let mut files = store.query_files(expr.as_ref(), args.explicit)?;

    if args.directory {
        files.retain(|f| f.is_dir);
    }
    if args.file {
        files.retain(|f| !f.is_dir);
    }
    if args.top {
        files = top_level_only(files);
    }

    match args.sort {
        Sort::Name => {} // already path-ordered
        Sort::Size => files.sort_by_key(|f| f.size),
        Sort::Time => files.sort_by_key(|f| f.mod_time),
        Sort::None => files.sort_by_key(|f| f.id),
    }

    if args.count {
        writeln!(out, "{}", files.len())?;
    } else {
        for file in &files {
            if args.print0 {
                write!(out, "{}\0", file.path().display())?;
            } else {
                writeln!(out, "{}", file.path().display())?;
            }
        }
    }

    Ok(CommandOutcome::new())
}

/// Drops entries that have an ancestor among the matched paths, so
/// only the top-most matches remain.
fn top_level_only(files: Vec<File>) -> Vec<File> {
    let paths: BTreeSet<PathBuf> = files.iter().map(|f| f.path()).collect();
    files
        .into_iter()
        .filter(|f| !f.path().ancestors().skip(1).any(|a| paths.contains(a)))
        .collect()
}
