//! Error types for the roster crate.
//!
//! A single semantic enum covers both input documents since they share the
//! same failure modes: the file could not be read, or its JSON is not the
//! expected shape.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a roster or connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The input file could not be read.
    #[error("failed to read input file at '{path}': {message}")]
    IoError {
        /// Path to the input file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The JSON is malformed or missing required fields.
    #[error("invalid JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The roster contains no users.
    #[error("roster contains no users")]
    EmptyRoster,

    /// A roster key is empty once trimmed.
    #[error("roster contains a blank username")]
    BlankUsername,

    /// A roster variable or restriction value is an object or array.
    #[error("roster user '{username}' has a non-scalar value for {field} entry '{key}'")]
    NonScalarValue {
        /// Roster username.
        username: String,
        /// `variables` or `restrictions`.
        field: &'static str,
        /// Variable name or restriction target.
        key: String,
    },

    /// A required descriptor value is blank.
    #[error("connection descriptor field '{field}' must not be blank")]
    BlankField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// The descriptor names a protocol other than `http` or `https`.
    #[error("unsupported protocol '{value}'; expected http or https")]
    UnsupportedProtocol {
        /// Protocol string found in the descriptor.
        value: String,
    },
}
