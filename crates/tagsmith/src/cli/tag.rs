//! Tag command - apply tags to files.
//!
//! Resolves each `TAG[=VALUE]` spec (creating tags and values when the
//! corresponding auto-create setting allows), upserts a file row per
//! path with a fresh fingerprint, drops tags already on the file
//! (directly or through an implication) or implied by the rest of the
//! applied set, and descends into directories with that elided set
//! when asked to.

use crate::cli::{CommandError, CommandOutcome, CommandResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tagsmith_db::{Settings, Store, TagId, ValueId, NO_VALUE_ID};
use tagsmith_fingerprint::FingerprintError;
use tracing::debug;

/// Arguments for the tag command.
#[derive(Debug, Default)]
pub struct TagArgs {
    /// `FILE TAG[=VALUE]...`, or just files when `--tags`/`--from` is
    /// given, or just tag names with `--create`.
    pub arguments: Vec<String>,
    pub tags: Option<String>,
    pub from: Option<PathBuf>,
    pub create: bool,
    pub recursive: bool,
    pub explicit: bool,
}

struct Apply<'a> {
    settings: &'a Settings,
    explicit: bool,
    recursive: bool,
}

/// Execute the tag command.
pub fn run(
    store: &Store,
    args: TagArgs,
    _out: &mut dyn Write,
    err: &mut dyn Write,
) -> CommandResult {
    let mut outcome = CommandOutcome::new();
    let tx = store.begin()?;
    let settings = store.settings()?;

    if args.create {
        if args.arguments.is_empty() {
            return Err(CommandError::usage("set of tags to create must be specified"));
        }
        create_tags(store, &args.arguments, &mut outcome, err)?;
        tx.commit()?;
        return Ok(outcome);
    }

    let (paths, pairs): (&[String], Vec<(TagId, ValueId)>) = if let Some(tag_list) = &args.tags
    {
        let specs: Vec<&str> = tag_list.split_whitespace().collect();
        if specs.is_empty() {
            return Err(CommandError::usage("set of tags to apply must be specified"));
        }
        if args.arguments.is_empty() {
            return Err(CommandError::usage("files to tag must be specified"));
        }
        let pairs = resolve_specs(store, &specs, &settings, &mut outcome, err)?;
        (&args.arguments, pairs)
    } else if let Some(source) = &args.from {
        if args.arguments.is_empty() {
            return Err(CommandError::usage("files to tag must be specified"));
        }
        (&args.arguments, pairs_from_file(store, source)?)
    } else {
        if args.arguments.len() < 2 {
            return Err(CommandError::usage(
                "file to tag and tags to apply must be specified",
            ));
        }
        let specs: Vec<&str> = args.arguments[1..].iter().map(String::as_str).collect();
        let pairs = resolve_specs(store, &specs, &settings, &mut outcome, err)?;
        (&args.arguments[..1], pairs)
    };

    let apply = Apply {
        settings: &settings,
        explicit: args.explicit,
        recursive: args.recursive,
    };
    for path in paths {
        let result = apply_path(store, Path::new(path), &pairs, &apply, &mut outcome, err);
        absorb_path_error(result, &mut outcome, err)?;
    }

    tx.commit()?;
    Ok(outcome)
}

/// Create tags without tagging any files (`--create`).
fn create_tags(
    store: &Store,
    names: &[String],
    outcome: &mut CommandOutcome,
    err: &mut dyn Write,
) -> Result<(), CommandError> {
    for name in names {
        if store.tag_by_name(name)?.is_some() {
            outcome.warn(err, format!("tag '{}' already exists", name))?;
            continue;
        }
        store.add_tag(name)?;
        debug!(tag = %name, "tag created");
    }
    Ok(())
}

/// Resolves `TAG[=VALUE]` specs into id pairs. Specs that reference a
/// missing tag or value when auto-creation is off are warned about and
/// skipped.
fn resolve_specs(
    store: &Store,
    specs: &[&str],
    settings: &Settings,
    outcome: &mut CommandOutcome,
    err: &mut dyn Write,
) -> Result<Vec<(TagId, ValueId)>, CommandError> {
    let mut pairs = Vec::with_capacity(specs.len());

    for spec in specs {
        if spec.starts_with('=') {
            outcome.warn(err, format!("invalid tag spec '{}'", spec))?;
            continue;
        }
        let (tag_name, value_name) = match spec.find('=') {
            Some(index) => (&spec[..index], &spec[index + 1..]),
            None => (*spec, ""),
        };

        let tag = match store.tag_by_name(tag_name)? {
            Some(tag) => tag,
            None if settings.auto_create_tags => {
                let tag = store.add_tag(tag_name)?;
                writeln!(err, "tagsmith: new tag '{}'", tag_name)?;
                tag
            }
            None => {
                outcome.warn(err, format!("no such tag '{}'", tag_name))?;
                continue;
            }
        };

        let value = match store.value_by_name(value_name)? {
            Some(value) => value,
            None if settings.auto_create_values => {
                let value = store.add_value(value_name)?;
                writeln!(err, "tagsmith: new value '{}'", value_name)?;
                value
            }
            None => {
                outcome.warn(err, format!("no such value '{}'", value_name))?;
                continue;
            }
        };

        pairs.push((tag.id, value.id));
    }

    Ok(pairs)
}

/// The explicit tags of the source file, for `--from`.
fn pairs_from_file(store: &Store, source: &Path) -> Result<Vec<(TagId, ValueId)>, CommandError> {
    let abs = absolute_path(source)?;
    let file = store.file_by_path(&abs)?.ok_or_else(|| {
        CommandError::usage(format!("{}: path is not tagged", abs.display()))
    })?;

    let pairs = store
        .file_tags_by_file_id(file.id, false)?
        .into_iter()
        .map(|ft| (ft.tag_id, ft.value_id))
        .collect();
    Ok(pairs)
}

/// Converts per-path permission and not-found failures into warnings
/// so the command continues with the remaining paths; anything else
/// aborts.
fn absorb_path_error(
    result: Result<(), CommandError>,
    outcome: &mut CommandOutcome,
    err: &mut dyn Write,
) -> Result<(), CommandError> {
    match result {
        Ok(()) => Ok(()),
        Err(CommandError::Path { path, source }) => match source.kind() {
            ErrorKind::PermissionDenied => {
                outcome.warn(err, format!("{}: permission denied", path))?;
                Ok(())
            }
            ErrorKind::NotFound => {
                outcome.warn(err, format!("{}: no such file", path))?;
                Ok(())
            }
            _ => Err(CommandError::Path { path, source }),
        },
        Err(other) => Err(other),
    }
}

fn apply_path(
    store: &Store,
    path: &Path,
    pairs: &[(TagId, ValueId)],
    apply: &Apply<'_>,
    outcome: &mut CommandOutcome,
    err: &mut dyn Write,
) -> Result<(), CommandError> {
    let abs = absolute_path(path)?;
    let (metadata, broken_link) = stat(&abs)?;

    if broken_link {
        writeln!(
            err,
            "tagsmith: {}: tagging broken symbolic link",
            abs.display()
        )?;
    }

    let mod_time = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .map_err(|source| path_error(&abs, source))?;
    let size = metadata.len() as i64;
    let is_dir = metadata.is_dir();

    let fingerprint = if broken_link {
        // best effort: the link target is gone, there is nothing to hash
        String::new()
    } else {
        tagsmith_fingerprint::create(&abs, apply.settings.fingerprint_algorithm)
            .map_err(fingerprint_error)?
    };

    debug!(path = %abs.display(), "upserting file");

    let file = match store.file_by_path(&abs)? {
        Some(existing) => {
            store.update_file(existing.id, &fingerprint, mod_time, size, is_dir)?;
            existing
        }
        None => {
            if apply.settings.report_duplicates && !fingerprint.is_empty() {
                let duplicates = store.files_by_fingerprint(&fingerprint)?;
                if let Some(other) = duplicates.first() {
                    writeln!(
                        err,
                        "tagsmith: {}: identical content to {}",
                        abs.display(),
                        other.path().display()
                    )?;
                }
            }
            store.add_file(&abs, &fingerprint, mod_time, size, is_dir)?
        }
    };

    let effective = if apply.explicit {
        pairs.to_vec()
    } else {
        elide_pairs(store, file.id, pairs)?
    };

    for (tag_id, value_id) in &effective {
        store.add_file_tag(file.id, *tag_id, *value_id)?;
    }

    if apply.recursive && is_dir {
        let mut children = Vec::new();
        let entries = fs::read_dir(&abs).map_err(|source| path_error(&abs, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| path_error(&abs, source))?;
            children.push(entry.path());
        }
        // readdir order is filesystem-dependent; sort for determinism
        children.sort();

        for child in children {
            let result = apply_path(store, &child, &effective, apply, outcome, err);
            absorb_path_error(result, outcome, err)?;
        }
    }

    Ok(())
}

/// Drops pairs already on the file (explicitly or through an
/// implication), and valueless pairs whose tag is implied by another
/// tag being applied.
fn elide_pairs(
    store: &Store,
    file_id: tagsmith_db::FileId,
    pairs: &[(TagId, ValueId)],
) -> Result<Vec<(TagId, ValueId)>, CommandError> {
    let existing: BTreeSet<(TagId, ValueId)> = store
        .file_tags_by_file_id(file_id, true)?
        .into_iter()
        .map(|ft| (ft.tag_id, ft.value_id))
        .collect();

    let applied_tags: Vec<TagId> = pairs.iter().map(|(tag_id, _)| *tag_id).collect();
    let implied = store.implied_tags(&applied_tags)?;

    Ok(pairs
        .iter()
        .copied()
        .filter(|(tag_id, value_id)| {
            !existing.contains(&(*tag_id, *value_id))
                && !(*value_id == NO_VALUE_ID && implied.contains(tag_id))
        })
        .collect())
}

/// Resolves to an absolute, lexically cleaned path. Symlinks are left
/// alone; only `.` and `..` components are folded away.
pub(crate) fn absolute_path(path: &Path) -> Result<PathBuf, CommandError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut clean = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    Ok(clean)
}

/// Stats a path, falling back to the link itself so broken symlinks
/// can still be tagged. The second element reports the fallback.
fn stat(path: &Path) -> Result<(fs::Metadata, bool), CommandError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok((metadata, false)),
        Err(source) if source.kind() == ErrorKind::NotFound => {
            match fs::symlink_metadata(path) {
                Ok(metadata) => Ok((metadata, true)),
                Err(source) => Err(path_error(path, source)),
            }
        }
        Err(source) => Err(path_error(path, source)),
    }
}

fn path_error(path: &Path, source: std::io::Error) -> CommandError {
    CommandError::Path {
        path: path.display().to_string(),
        source,
    }
}

fn fingerprint_error(error: FingerprintError) -> CommandError {
    match error {
        FingerprintError::Io { path, source } => CommandError::Path { path, source },
        other => CommandError::Fingerprint(other),
    }
}
