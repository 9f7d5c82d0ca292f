//! Config command - list or change settings.

use crate::cli::{CommandError, CommandOutcome, CommandResult};
use std::io::Write;
use tagsmith_db::Store;

/// Arguments for the config command.
#[derive(Debug, Default)]
pub struct ConfigArgs {
    /// `NAME=VALUE` assignments; empty lists the current settings.
    pub assignments: Vec<String>,
}

/// Execute the config command.
pub fn run(
    store: &Store,
    args: ConfigArgs,
    out: &mut dyn Write,
    _err: &mut dyn Write,
) -> CommandResult {
    if args.assignments.is_empty() {
        for (name, value) in store.settings()?.entries() {
            writeln!(out, "{}={}", name, value)?;
        }
        return Ok(CommandOutcome::new());
    }

    let tx = store.begin()?;
    for assignment in &args.assignments {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            CommandError::usage(format!(
                "invalid setting assignment '{}': expected NAME=VALUE",
                assignment
            ))
        })?;
        store.set_setting(name, value)?;
    }
    tx.commit()?;

    Ok(CommandOutcome::new())
}
