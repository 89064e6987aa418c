//! Error types shared by the type registry and the dump parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown format, encoding, or option value. Raised at construction
    /// time, before any line is parsed.
    #[error("unknown {kind} {given:?}, expected one of: {expected}")]
    Config {
        kind: &'static str,
        given: String,
        expected: &'static str,
    },

    /// Type lookup against an architecture table that has no such name.
    #[error("architecture {arch} has no type named {name:?}")]
    UnknownType { arch: String, name: String },

    /// A token that cannot be parsed in the active numeric base.
    #[error("cannot parse {token:?} as {what} on line {line}")]
    Parse {
        token: String,
        what: String,
        line: usize,
    },

    /// Addresses or repeat markers that do not line up with each other.
    #[error("inconsistent dump on line {line}: {reason}")]
    Inconsistent { line: usize, reason: String },

    /// A value that does not fit the width/signedness of a scalar type.
    #[error("value {value} does not fit {type_name}")]
    Range { type_name: &'static str, value: i128 },

    /// Integer packing requested on a float type, or the other way around.
    #[error("{type_name} cannot pack {given} value")]
    Mismatch {
        type_name: &'static str,
        given: &'static str,
    },

    /// Buffer handed to unpack is shorter than the type.
    #[error("{type_name} needs {needed} bytes, got {got}")]
    Truncated {
        type_name: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
