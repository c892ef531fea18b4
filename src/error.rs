use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an extraction run.
///
/// Per-file and per-line problems (missing files, undated lines) are not
/// errors; they are logged and skipped by the extractor.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A `--since`/`--until` value did not match `<Mon> <DD> <HH:MM:SS>`.
    #[error("invalid {flag} timestamp '{value}' (expected e.g. \"Oct 28 10:00:00\"): {source}")]
    InvalidTimestamp {
        flag: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    /// A keyword could not be compiled in regex mode.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("no keywords given")]
    NoKeywords,

    /// I/O error with path context.
    #[error("I/O error during {operation} on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl ExtractError {
    pub(crate) fn io(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            operation,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
