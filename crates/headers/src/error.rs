//! Error types surfaced by header parsing and construction.
//!
//! Scanners never fail loudly: they report `None` and the parser engine turns
//! that into either an `Option` (the `try_*` family) or a
//! [`HeaderError::InvalidFormat`] (the `parse*` family). Validating constructors
//! and setters report [`HeaderError::InvalidArgument`] or
//! [`HeaderError::OutOfRange`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("the header contains invalid values at index {index}: '{value}'")]
    InvalidFormat { index: usize, value: String },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("value out of range: {reason}")]
    OutOfRange { reason: String },
}

impl HeaderError {
    pub fn invalid_format<S: ToString>(index: usize, value: S) -> Self {
        Self::InvalidFormat { index, value: value.to_string() }
    }

    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }

    pub fn out_of_range<S: ToString>(str: S) -> Self {
        Self::OutOfRange { reason: str.to_string() }
    }

    pub(crate) fn invalid_token(value: &str) -> Self {
        Self::invalid_argument(format!("the format of value '{value}' is invalid, a token is expected"))
    }
}
