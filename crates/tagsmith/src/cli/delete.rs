//! Delete command - remove tags from the database entirely.
//!
//! Deleting a tag cascades to its file-tag rows and implications;
//! files and values left unreferenced are vacuumed afterwards.

use crate::cli::{CommandError, CommandOutcome, CommandResult};
use std::io::Write;
use tagsmith_db::Store;

/// Arguments for the delete command.
#[derive(Debug, Default)]
pub struct DeleteArgs {
    pub tags: Vec<String>,
}

/// Execute the delete command.
pub fn run(
    store: &Store,
    args: DeleteArgs,
    _out: &mut dyn Write,
    err: &mut dyn Write,
) -> CommandResult {
    if args.tags.is_empty() {
        return Err(CommandError::usage("tags to delete must be specified"));
    }

    let mut outcome = CommandOutcome::new();
    let tx = store.begin()?;

    for name in &args.tags {
        match store.tag_by_name(name)? {
            Some(tag) => store.delete_tag(tag.id)?,
            None => outcome.warn(err, format!("no such tag '{}'", name))?,
        }
    }

    store.delete_untagged_files()?;
    store.delete_unused_values()?;

    tx.commit()?;
    Ok(outcome)
}
