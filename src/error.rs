//! Errors raised while reading variant tables.

use thiserror::Error;

/// Everything that can go wrong with a tab-separated table. Every
/// record-level variant carries the 1-based line number and the
/// column it refers to.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("empty input: no header line found")]
    EmptyInput,

    #[error("missing required column `{0}` in header")]
    MissingColumn(Box<str>),

    #[error("line {line}: no value for column `{column}` (row has {found} fields)")]
    ShortRow {
        line: usize,
        column: Box<str>,
        found: usize,
    },

    #[error("line {line}: cannot parse `{value}` in column `{column}` as {expected}")]
    ParseValue {
        line: usize,
        column: Box<str>,
        value: Box<str>,
        expected: &'static str,
    },

    #[error("line {line}: malformed entry `{value}` in column `{column}`")]
    Malformed {
        line: usize,
        column: Box<str>,
        value: Box<str>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(Box<str>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
