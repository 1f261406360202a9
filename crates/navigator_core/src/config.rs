//! Runtime configuration resolved from environment variables.
//!
//! | Variable              | Meaning                         | Default                          |
//! |-----------------------|---------------------------------|----------------------------------|
//! | `NAVIGATOR_DB_PATH`   | SQLite database file            | `<temp dir>/navigator.sqlite3`   |
//! | `NAVIGATOR_LOG_LEVEL` | `trace\|debug\|info\|warn\|error` | [`default_log_level`]            |
//! | `NAVIGATOR_LOG_DIR`   | absolute directory for log files | unset: file logging disabled     |
//!
//! Blank values count as unset.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "NAVIGATOR_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "NAVIGATOR_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "NAVIGATOR_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "navigator.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }
}
