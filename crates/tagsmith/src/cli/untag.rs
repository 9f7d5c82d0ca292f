//! Untag command - remove tags from files.
//!
//! After removal, file rows left with no tags are deleted and values
//! no longer referenced by any file-tag are vacuumed.

use crate::cli::tag::absolute_path;
use crate::cli::{CommandError, CommandOutcome, CommandResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tagsmith_db::{Store, StoreError, TagId, ValueId};

/// Arguments for the untag command.
#[derive(Debug, Default)]
pub struct UntagArgs {
    /// `FILE TAG[=VALUE]...`, or just files when `--tags` is given.
    pub arguments: Vec<String>,
    pub tags: Option<String>,
    pub recursive: bool,
}

/// A resolved spec kept alongside its source text for messages.
struct Removal {
    spec: String,
    tag_id: TagId,
    value_id: ValueId,
}

/// Execute the untag command.
pub fn run(
    store: &Store,
    args: UntagArgs,
    _out: &mut dyn Write,
    err: &mut dyn Write,
) -> CommandResult {
    let mut outcome = CommandOutcome::new();
    let tx = store.begin()?;

    let (paths, specs): (&[String], Vec<&str>) = if let Some(tag_list) = &args.tags {
        let specs: Vec<&str> = tag_list.split_whitespace().collect();
        if specs.is_empty() {
            return Err(CommandError::usage("set of tags to remove must be specified"));
        }
        if args.arguments.is_empty() {
            return Err(CommandError::usage("files to untag must be specified"));
        }
        (&args.arguments, specs)
    } else {
        if args.arguments.len() < 2 {
            return Err(CommandError::usage(
                "file to untag and tags to remove must be specified",
            ));
        }
        let specs = args.arguments[1..].iter().map(String::as_str).collect();
        (&args.arguments[..1], specs)
    };

    let removals = resolve_removals(store, &specs, &mut outcome, err)?;

    for path in paths {
        untag_path(store, Path::new(path), &removals, args.recursive, &mut outcome, err)?;
    }

    store.delete_untagged_files()?;
    store.delete_unused_values()?;

    tx.commit()?;
    Ok(outcome)
}

fn resolve_removals(
    store: &Store,
    specs: &[&str],
    outcome: &mut CommandOutcome,
    err: &mut dyn Write,
) -> Result<Vec<Removal>, CommandError> {
    let mut removals = Vec::with_capacity(specs.len());

    for spec in specs {
        let (tag_name, value_name) = match spec.find('=') {
            Some(index) => (&spec[..index], &spec[index + 1..]),
            None => (*spec, ""),
        };

        let tag = match store.tag_by_name(tag_name)? {
            Some(tag) => tag,
            None => {
                outcome.warn(err, format!("no such tag '{}'", tag_name))?;
                continue;
            }
        };
        let value = match store.value_by_name(value_name)? {
            Some(value) => value,
            None => {
                outcome.warn(err, format!("no such value '{}'", value_name))?;
                continue;
            }
        };

        removals.push(Removal {
            spec: spec.to_string(),
            tag_id: tag.id,
            value_id: value.id,
        });
    }

    Ok(removals)
}

fn untag_path(
    store: &Store,
    path: &Path,
    removals: &[Removal],
    recursive: bool,
    outcome: &mut CommandOutcome,
    err: &mut dyn Write,
) -> Result<(), CommandError> {
    let abs = absolute_path(path)?;

    let file = match store.file_by_path(&abs)? {
        Some(file) => file,
        None => {
            outcome.warn(err, format!("{}: not tagged", abs.display()))?;
            return Ok(());
        }
    };

    for removal in removals {
        match store.delete_file_tag(file.id, removal.tag_id, removal.value_id) {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                outcome.warn(
                    err,
                    format!("{}: file is not tagged '{}'", abs.display(), removal.spec),
                )?;
            }
            Err(other) => return Err(other.into()),
        }
    }

    if recursive && file.is_dir {
        let entries = match fs::read_dir(&abs) {
            Ok(entries) => entries,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                // directory row outlived the directory itself
                return Ok(());
            }
            Err(source) => {
                return Err(CommandError::Path {
                    path: abs.display().to_string(),
                    source,
                })
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CommandError::Path {
                path: abs.display().to_string(),
                source,
            })?;
            children.push(entry.path());
        }
        children.sort();

        for child in children {
            untag_path(store, &child, removals, true, outcome, err)?;
        }
    }

    Ok(())
}
