use std::fmt;

use thiserror::Error;

/// Errors raised by argument validation, addressing and dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlasError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("invalid pointer: operand '{0}' is null")]
    InvalidPointer(&'static str),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error(
        "operand '{operand}' out of bounds in batch {batch}: \
         elements {lo}..={hi} requested, buffer holds {len}"
    )]
    OutOfBounds {
        operand: &'static str,
        batch: usize,
        lo: isize,
        hi: isize,
        len: usize,
    },

    #[error("operand '{operand}' has no pointer for batch {batch}")]
    MissingBatchPointer { operand: &'static str, batch: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

impl BlasError {
    /// The public status code this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            BlasError::InvalidValue(_) | BlasError::Config(_) => Status::InvalidValue,
            BlasError::InvalidSize(_) | BlasError::OutOfBounds { .. } => Status::InvalidSize,
            BlasError::InvalidPointer(_) | BlasError::MissingBatchPointer { .. } => {
                Status::InvalidPointer
            }
            BlasError::NotImplemented(_) => Status::NotImplemented,
        }
    }
}

/// Closed set of outcomes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidValue,
    InvalidSize,
    InvalidPointer,
    NotImplemented,
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl<T> From<std::result::Result<T, BlasError>> for Status {
    fn from(result: std::result::Result<T, BlasError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

impl From<&BlasError> for Status {
    fn from(err: &BlasError) -> Self {
        err.status()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::InvalidValue => write!(f, "invalid_value"),
            Status::InvalidSize => write!(f, "invalid_size"),
            Status::InvalidPointer => write!(f, "invalid_pointer"),
            Status::NotImplemented => write!(f, "not_implemented"),
        }
    }
}
