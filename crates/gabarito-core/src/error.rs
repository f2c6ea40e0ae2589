//! Loader error types.
//!
//! These errors cover reading and parsing the flat-file inputs. Defined as
//! a typed enum so the catalog can classify failures for skip-and-continue
//! decisions without string matching. Nothing in the scoring engine itself
//! can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading response tables and answer keys.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file does not exist or could not be read.
    #[error("cannot read {path}: {message}")]
    UnreadableSource { path: PathBuf, message: String },

    /// The file has no header line.
    #[error("{path} is empty")]
    EmptySource { path: PathBuf },

    /// A key row carried a question number that is not a positive integer.
    #[error("{path}:{line}: invalid question number '{value}'")]
    InvalidQuestionNumber {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// The header is missing a required column.
    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
}

impl LoadError {
    /// Returns `true` if the failure means the source is absent or
    /// unreadable, in which case the catalog skips it and continues.
    /// Structural errors inside a file that was read are not skippable;
    /// they fail the load so bad data never reaches the scores.
    pub fn is_missing_source(&self) -> bool {
        matches!(self, LoadError::UnreadableSource { .. })
    }
}
