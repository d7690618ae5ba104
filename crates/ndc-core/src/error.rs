//! Errors returned by the message decoder.
//!
//! Every failure is returned to the caller as a typed [`DecodeError`]; the
//! decoder never recovers internally and never logs a failure itself.  Each
//! variant carries enough context (offending code, expected versus actual
//! length) for the caller to log the problem and drop the message.

use thiserror::Error;

use crate::tables::CodeTable;

/// Errors that can occur while decoding a host message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The leading character of the message class field is not a known class.
    #[error("unknown message class: {0:?}")]
    UnknownMessageClass(char),

    /// The terminal command code is not in the command table.
    #[error("unknown terminal command code: {0:?}")]
    UnknownCommandCode(char),

    /// A single-character code is not present in its lookup table.
    #[error("unknown {table} code: {code:?}")]
    UnknownCode { table: CodeTable, code: char },

    /// The message carries fewer fields or bytes than its grammar requires.
    #[error("truncated message: {context} needs {needed}, got {available}")]
    TruncatedMessage {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    /// A repeated-record payload does not split into whole records.
    #[error("truncated record: {length}-byte {shape} payload does not frame into {width}-byte records")]
    TruncatedRecord {
        shape: &'static str,
        width: usize,
        length: usize,
    },

    /// A fixed-width composite field does not match its layout.
    #[error("malformed composite field {field}: expected {expected} bytes, got {actual}")]
    MalformedComposite {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The declared frame length is shorter than the message body supplied.
    #[error("declared length {declared} does not match the {actual}-byte message body")]
    LengthMismatch { declared: usize, actual: usize },
}
