//! Tagsmith binary: argument parsing, logging setup and dispatch.
//!
//! Exit codes: 0 success, 1 one or more warnings, 2 usage error,
//! 3 internal or storage error.

use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tagsmith::cli;
use tagsmith_db::Store;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tagsmith",
    about = "Tag files and query them with boolean tag expressions",
    version
)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Database file (defaults to $TAGSMITH_DB, then the user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List files matching a tag query
    Files {
        /// Query expression, e.g. beach and not year = 2014
        query: Vec<String>,

        /// List only directories
        #[arg(short = 'd', long)]
        directory: bool,

        /// List only regular files
        #[arg(short = 'f', long)]
        file: bool,

        /// List only the top-most matching paths
        #[arg(short = 't', long)]
        top: bool,

        /// Print the match count instead of the paths
        #[arg(short = 'c', long)]
        count: bool,

        /// Terminate paths with NUL instead of newline
        #[arg(short = '0', long)]
        print0: bool,

        /// Do not expand tags through implications
        #[arg(short = 'e', long)]
        explicit: bool,

        /// Result ordering
        #[arg(long, value_enum, default_value = "name")]
        sort: cli::files::Sort,
    },

    /// Apply tags to files
    Tag {
        /// FILE TAG[=VALUE]... (just files with --tags or --from; tag
        /// names with --create)
        arguments: Vec<String>,

        /// The set of tags to apply
        #[arg(short = 't', long, value_name = "TAGS")]
        tags: Option<String>,

        /// Copy the explicit tags of SRC
        #[arg(short = 'f', long, value_name = "SRC")]
        from: Option<PathBuf>,

        /// Create tags without tagging any files
        #[arg(short = 'c', long)]
        create: bool,

        /// Recursively tag directory contents
        #[arg(short = 'r', long)]
        recursive: bool,

        /// Apply tags even if they are already implied
        #[arg(short = 'e', long)]
        explicit: bool,
    },

    /// Remove tags from files
    Untag {
        /// FILE TAG[=VALUE]... (just files with --tags)
        arguments: Vec<String>,

        /// The set of tags to remove
        #[arg(short = 't', long, value_name = "TAGS")]
        tags: Option<String>,

        /// Recursively untag directory contents
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// List or manage tag implications
    Imply {
        /// TAG IMPLIED... (empty lists the implication table)
        tags: Vec<String>,

        /// Remove the implication instead of adding it
        #[arg(short = 'd', long)]
        delete: bool,
    },

    /// Delete tags from the database entirely
    Delete {
        /// Tags to delete
        tags: Vec<String>,
    },

    /// List or change settings
    Config {
        /// NAME=VALUE assignments (empty lists current settings)
        assignments: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let db_path = match database_path(cli.database) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("tagsmith: {}", message);
            return ExitCode::from(3);
        }
    };

    let store = match Store::open(&db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("tagsmith: {}", err);
            return ExitCode::from(3);
        }
    };

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let result = match cli.command {
        Commands::Files {
            query,
            directory,
            file,
            top,
            count,
            print0,
            explicit,
            sort,
        } => cli::files::run(
            &store,
            cli::files::FilesArgs {
                query,
                directory,
                file,
                top,
                count,
                print0,
                explicit,
                sort,
            },
            &mut stdout,
            &mut stderr,
        ),
        Commands::Tag {
            arguments,
            tags,
            from,
            create,
            recursive,
            explicit,
        } => cli::tag::run(
            &store,
            cli::tag::TagArgs {
                arguments,
                tags,
                from,
                create,
                recursive,
                explicit,
            },
            &mut stdout,
            &mut stderr,
        ),
        Commands::Untag {
            arguments,
            tags,
            recursive,
        } => cli::untag::run(
            &store,
            cli::untag::UntagArgs {
                arguments,
                tags,
                recursive,
            },
            &mut stdout,
            &mut stderr,
        ),
        Commands::Imply { tags, delete } => cli::imply::run(
            &store,
            cli::imply::ImplyArgs { tags, delete },
            &mut stdout,
            &mut stderr,
        ),
        Commands::Delete { tags } => cli::delete::run(
            &store,
            cli::delete::DeleteArgs { tags },
            &mut stdout,
            &mut stderr,
        ),
        Commands::Config { assignments } => cli::config::run(
            &store,
            cli::config::ConfigArgs { assignments },
            &mut stdout,
            &mut stderr,
        ),
    };

    match result {
        Ok(outcome) if outcome.ok() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            let _ = writeln!(stderr, "tagsmith: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "tagsmith=info" } else { "tagsmith=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The database file: `--database`, then `$TAGSMITH_DB`, then
/// `<data dir>/tagsmith/default.db`.
fn database_path(flag: Option<PathBuf>) -> Result<PathBuf, String> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Ok(path) = std::env::var("TAGSMITH_DB") {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| "could not determine user data directory".to_string())?;
    Ok(data_dir.join("tagsmith").join("default.db"))
}
