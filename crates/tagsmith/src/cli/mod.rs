//! CLI commands.
//!
//! Every command takes the open store plus a pair of output sinks: the
//! normal stream carries only query results and structured data, the
//! diagnostic stream carries warnings and notices. Commands return a
//! [`CommandOutcome`]; the process exit code is derived from it (and
//! from [`CommandError::exit_code`] on failure) rather than from any
//! sentinel error value.

pub mod config;
pub mod delete;
pub mod files;
pub mod imply;
pub mod tag;
pub mod untag;

use std::io::Write;
use thiserror::Error;

/// What a completed command wants the caller to know: whether any
/// warnings were emitted along the way.
#[derive(Debug, Default)]
pub struct CommandOutcome {
    pub warnings: Vec<String>,
}

impl CommandOutcome {
    pub fn new() -> Self {
        CommandOutcome::default()
    }

    /// True when the command completed without warnings.
    pub fn ok(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Records a warning and prints it to the diagnostic stream.
    pub fn warn(
        &mut self,
        err: &mut dyn Write,
        message: impl Into<String>,
    ) -> std::io::Result<()> {
        let message = message.into();
        writeln!(err, "tagsmith: {}", message)?;
        self.warnings.push(message);
        Ok(())
    }
}

/// A command failure. Usage-shaped failures exit 2, everything else 3;
/// warnings are not failures and exit 1 via [`CommandOutcome`].
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Parse(#[from] tagsmith_query::ParseError),

    #[error(transparent)]
    Store(#[from] tagsmith_db::StoreError),

    #[error(transparent)]
    Fingerprint(#[from] tagsmith_fingerprint::FingerprintError),

    #[error("{path}: {source}")]
    Path {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub fn usage(message: impl Into<String>) -> Self {
        CommandError::Usage(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Usage(_) | CommandError::Parse(_) => 2,
            _ => 3,
        }
    }
}

pub type CommandResult = std::result::Result<CommandOutcome, CommandError>;
