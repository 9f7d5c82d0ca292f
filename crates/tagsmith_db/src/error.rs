//! Error types for the entity store.

use thiserror::Error;

/// Store operation result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Entity store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid tag name '{0}'")]
    InvalidTagName(String),

    #[error("invalid value name '{0}'")]
    InvalidValueName(String),

    /// Unique-key collision on insert.
    #[error("{entity} '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    /// A referenced row does not exist.
    #[error("no such {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },

    /// A structurally forbidden request, e.g. a tag implying itself.
    #[error("{0}")]
    InvalidOperation(String),

    /// Schema, constraint or transaction failure in the underlying
    /// database.
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure while opening or creating the database.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound { entity, key: key.into() }
    }

    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::Duplicate { entity, key: key.into() }
    }
}

/// Maps a unique-constraint failure onto [`StoreError::Duplicate`];
/// everything else passes through as a storage error.
pub(crate) fn duplicate_on_conflict(
    err: rusqlite::Error,
    entity: &'static str,
    key: &str,
) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::duplicate(entity, key)
        }
        _ => StoreError::Sqlite(err),
    }
}
