use sift_value::ValueKind;
use thiserror::Error;

use crate::pipeline::Mode;

/// Error returned by pre- and post-transforms. Recorded opaquely.
pub type TransformError = anyhow::Error;

/// A coercer could not shape the input into the node's type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoerceError {
    #[error("expected {expected}, got {actual}")]
    Mismatch {
        expected: &'static str,
        actual: ValueKind,
    },

    #[error("cannot parse {input:?} as {expected}")]
    Parse {
        expected: &'static str,
        input: String,
    },

    #[error("{value} is out of range for {expected}")]
    OutOfRange {
        expected: &'static str,
        value: String,
    },
}

/// A pre-transform ran into a call of the other mode.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{registered}-mode pre-transform cannot run in {mode} mode")]
pub struct ModeMismatch {
    pub registered: Mode,
    pub mode: Mode,
}
