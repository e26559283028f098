//! Error types for the fallible edges of the crate.
//!
//! The simulation itself never fails. Errors only come from reading outside
//! data: tuning/settings documents and level definitions. Callers that want
//! to keep playing log the error and fall back to defaults.

use std::fmt;

/// Top-level error enum
#[derive(Debug)]
pub enum Error {
    /// A JSON document (tuning, settings, level pack) did not parse.
    Json {
        /// What was being read, for logging.
        what: &'static str,
        source: serde_json::Error,
    },

    /// A file could not be read.
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A level grid contained a cell that is not `0`-`3` (or whitespace).
    BadGridCell {
        row: usize,
        col: usize,
        found: char,
    },

    /// A level grid had no rows.
    EmptyGrid,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Json { what, source } => write!(f, "invalid {} document: {}", what, source),
            Error::Io { path, source } => write!(f, "could not read '{}': {}", path, source),
            Error::BadGridCell { row, col, found } => write!(
                f,
                "unexpected level cell {:?} at row {}, column {} (expected 0-3)",
                found, row, col
            ),
            Error::EmptyGrid => write!(f, "level grid has no rows"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json { source, .. } => Some(source),
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, Error>;
