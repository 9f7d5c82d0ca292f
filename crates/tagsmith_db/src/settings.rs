//! Typed configuration backed by the `setting` table.
//!
//! The recognised settings form a closed set; rows with unknown names
//! are ignored on load and rejected on write.

use crate::error::{Result, StoreError};
use crate::Store;
use rusqlite::params;
use tagsmith_fingerprint::Algorithm;

/// The closed set of recognised setting names.
pub const SETTING_NAMES: &[&str] = &[
    "fingerprintAlgorithm",
    "autoCreateTags",
    "autoCreateValues",
    "reportDuplicates",
];

/// Effective configuration: stored rows over the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub fingerprint_algorithm: Algorithm,
    pub auto_create_tags: bool,
    pub auto_create_values: bool,
    pub report_duplicates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            fingerprint_algorithm: Algorithm::DynamicSha256,
            auto_create_tags: true,
            auto_create_values: true,
            report_duplicates: true,
        }
    }
}

impl Settings {
    /// All settings rendered as `(name, value)` rows for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "fingerprintAlgorithm",
                self.fingerprint_algorithm.as_str().to_string(),
            ),
            ("autoCreateTags", render_bool(self.auto_create_tags)),
            ("autoCreateValues", render_bool(self.auto_create_values)),
            ("reportDuplicates", render_bool(self.report_duplicates)),
        ]
    }
}

fn render_bool(value: bool) -> String {
    if value { "yes".to_string() } else { "no".to_string() }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "yes" | "true" | "1" => Ok(true),
        "no" | "false" | "0" => Ok(false),
        _ => Err(StoreError::InvalidOperation(format!(
            "invalid value '{}' for setting '{}'",
            value, name
        ))),
    }
}

fn parse_algorithm(value: &str) -> Result<Algorithm> {
    value
        .parse::<Algorithm>()
        .map_err(|err| StoreError::InvalidOperation(err.to_string()))
}

impl Store {
    /// Loads the effective settings.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        let mut stmt = self.conn().prepare("SELECT name, value FROM setting")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for (name, value) in rows {
            match name.as_str() {
                "fingerprintAlgorithm" => {
                    settings.fingerprint_algorithm = parse_algorithm(&value)?;
                }
                "autoCreateTags" => {
                    settings.auto_create_tags = parse_bool(&name, &value)?;
                }
                "autoCreateValues" => {
                    settings.auto_create_values = parse_bool(&name, &value)?;
                }
                "reportDuplicates" => {
                    settings.report_duplicates = parse_bool(&name, &value)?;
                }
                _ => {} // stale rows from older versions are ignored
            }
        }

        Ok(settings)
    }

    /// Stores a setting. The name must be one of [`SETTING_NAMES`] and
    /// the value must parse for that setting.
    pub fn set_setting(&self, name: &str, value: &str) -> Result<()> {
        let canonical = match name {
            "fingerprintAlgorithm" => parse_algorithm(value)?.as_str().to_string(),
            "autoCreateTags" | "autoCreateValues" | "reportDuplicates" => {
                render_bool(parse_bool(name, value)?)
            }
            _ => return Err(StoreError::not_found("setting", name)),
        };

        self.conn().execute(
            "INSERT INTO setting (name, value) VALUES (?1, ?2)
             ON CONFLICT (name) DO UPDATE SET value = ?2",
            params![name, canonical],
        )?;
        Ok(())
    }
}
