//! Imply command - manage tag implications.
//!
//! With no arguments, lists the implication table. With tag names,
//! records that the first tag implies each of the others; `--delete`
//! removes those pairs instead.

use crate::cli::{CommandError, CommandOutcome, CommandResult};
use std::io::Write;
use tagsmith_db::{Store, StoreError, Tag};

/// Arguments for the imply command.
#[derive(Debug, Default)]
pub struct ImplyArgs {
    /// `TAG IMPLIED...`; empty lists the table.
    pub tags: Vec<String>,
    pub delete: bool,
}

/// Execute the imply command.
pub fn run(
    store: &Store,
    args: ImplyArgs,
    out: &mut dyn Write,
    _err: &mut dyn Write,
) -> CommandResult {
    if args.tags.is_empty() {
        if args.delete {
            return Err(CommandError::usage(
                "implication to delete must be specified",
            ));
        }
        for (tag, implied) in store.implication_pairs()? {
            writeln!(out, "{} -> {}", tag.name, implied.name)?;
        }
        return Ok(CommandOutcome::new());
    }

    if args.tags.len() < 2 {
        return Err(CommandError::usage(
            "tag and tags implied by it must be specified",
        ));
    }

    let tx = store.begin()?;

    let tag = resolve_tag(store, &args.tags[0])?;
    for implied_name in &args.tags[1..] {
        let implied = resolve_tag(store, implied_name)?;
        if args.delete {
            store.delete_implication(tag.id, implied.id)?;
        } else {
            store.add_implication(tag.id, implied.id)?;
        }
    }

    tx.commit()?;
    Ok(CommandOutcome::new())
}

fn resolve_tag(store: &Store, name: &str) -> Result<Tag, CommandError> {
    store
        .tag_by_name(name)?
        .ok_or_else(|| StoreError::not_found("tag", name).into())
}
