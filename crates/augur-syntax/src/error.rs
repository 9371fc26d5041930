//! Structured syntax errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error produced by the lexer or parser.
///
/// The `Display` form embeds the position as `"... at line L, column C"`;
/// downstream tooling that only sees rendered strings recovers positions by
/// matching that suffix. Positions are 1-based; a zero line means the error
/// has no usable location.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    /// Human-readable description of what went wrong
    pub message: String,
    /// Line of the offending token (1-based)
    pub line: u32,
    /// Column of the offending token (1-based)
    pub column: u32,
}

impl SyntaxError {
    /// Create a new syntax error at the given position
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}
