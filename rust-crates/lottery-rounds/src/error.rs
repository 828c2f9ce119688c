use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("`{0}` is not a non-negative decimal integer")]
    NotDecimal(String),
    #[error("`{0}` is not an integer")]
    NotInteger(String),
    #[error("`{0}` is not a hex integer")]
    NotHex(String),
    #[error("expected an integer, found {0}")]
    NotNumeric(String),
}

/// A ledger answer that arrived but could not be turned into a round record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown round status code {0}")]
    UnknownStatus(u64),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}`: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("field `{field}` does not fit in {target}")]
    OutOfRange {
        field: &'static str,
        target: &'static str,
    },
    #[error("field `{field}` holds {found} brackets, expected {expected}")]
    BracketCount {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("expected a round tuple or object, found {0}")]
    Shape(String),
}
