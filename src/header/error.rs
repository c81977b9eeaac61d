//! Error types for makeself header scanning.

use thiserror::Error;

use crate::lexer::LexError;

/// Errors that can occur while scanning a makeself header.
///
/// Every variant other than [`Io`] and [`Lex`] means the input is not a
/// recognized makeself archive.  Scan failures are permanent for a given
/// file; there is nothing to retry.
///
/// [`Io`]: ScanError::Io
/// [`Lex`]: ScanError::Lex
#[derive(Debug, Error)]
pub enum ScanError {
    /// I/O error opening or reading the archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header could not be tokenized (typically an unterminated quote).
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),

    /// No `filesizes=` assignment within the scan bound.
    #[error("could not find the filesizes assignment")]
    MissingSizeList,

    /// The `filesizes=` value contained no sizes at all.
    #[error("the filesizes list is empty")]
    EmptySizeList,

    /// An entry in the `filesizes=` list is not a non-negative integer.
    #[error("invalid size in filesizes list: {token:?}")]
    BadSize {
        /// The offending list entry.
        token: String,
    },

    /// No `--tar` flag within the scan bound.
    #[error("could not find the definition of --tar")]
    MissingTarMarker,

    /// No `offset=` assignment before the enclosing case clause ended.
    #[error("could not find the offset definition")]
    MissingOffsetAssignment,

    /// The `offset=` command is not the fixed `head | wc | tr` pipeline.
    #[error("offset command mismatch:\n expected `{expected}`\n but got  `{actual}`")]
    OffsetCommandMismatch {
        /// The reference command, with the observed line count substituted.
        expected: String,
        /// The command actually found in the header.
        actual: String,
    },

    /// The line count inside the offset command is not an integer.
    #[error("invalid header line count: {token:?}")]
    BadLineCount {
        /// The token found in the line count slot.
        token: String,
    },
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
