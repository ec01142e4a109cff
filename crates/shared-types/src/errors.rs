//! # Error Types
//!
//! Errors raised while parsing shared value types.

use thiserror::Error;

/// An identifier string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} identifier: {value}")]
pub struct IdParseError {
    /// Which identifier kind was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}
