//! Error types for pixelfun program parsing.
//!
//! Parsing is the only fallible operation of the engine: evaluation is total and
//! degrades to defined numeric results. Every error carries the byte offset at which
//! the parser gave up so the control channel can point at the offending character.
//! The type is `Copy` and allocation-free so it can cross the C ABI.

use core::fmt;
use core::num::ParseFloatError;

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, ParseError>;

/// Error type for program parsing.
///
/// Syntax errors and arena exhaustion are reported the same way from the caller's
/// point of view: the program is rejected and the engine is left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The input ended where an operand was required.
    ///
    /// `""`, `"1 +"` and `"sin("` all end here.
    UnexpectedEnd { position: usize },

    /// A byte that cannot start an operand.
    UnexpectedChar { position: usize, found: u8 },

    /// Something that looked like a number but did not scan as one.
    InvalidNumber { position: usize },

    /// A word that is not one of `t`, `i`, `x`, `y`, `pi`, `tau`.
    UnknownIdentifier { position: usize },

    /// A word followed by `(` that is not a built-in function.
    UnknownFunction { position: usize },

    /// A built-in function called with the wrong number of arguments.
    ArgumentCount {
        /// Name of the function that was called
        function: &'static str,
        /// Number of arguments the function takes
        expected: usize,
        /// Where the parser expected `,` or `)`
        position: usize,
    },

    /// An opening parenthesis without its closing partner.
    UnmatchedParenthesis { position: usize },

    /// A complete expression followed by more non-whitespace input.
    TrailingInput { position: usize },

    /// Parentheses or calls nested deeper than [`crate::parser::MAX_NESTING`].
    NestingTooDeep { position: usize },

    /// The node arena ran out of slots while building the tree.
    OutOfMemory { capacity: usize },
}

impl ParseError {
    /// Stable numeric code used by the C ABI. Always positive.
    pub fn error_code(&self) -> i32 {
        match self {
            ParseError::UnexpectedEnd { .. } => 1,
            ParseError::UnexpectedChar { .. } => 2,
            ParseError::InvalidNumber { .. } => 3,
            ParseError::UnknownIdentifier { .. } => 4,
            ParseError::UnknownFunction { .. } => 5,
            ParseError::ArgumentCount { .. } => 6,
            ParseError::UnmatchedParenthesis { .. } => 7,
            ParseError::TrailingInput { .. } => 8,
            ParseError::NestingTooDeep { .. } => 9,
            ParseError::OutOfMemory { .. } => 10,
        }
    }

    /// Byte offset the error refers to, if it has one.
    pub fn position(&self) -> Option<usize> {
        match *self {
            ParseError::UnexpectedEnd { position }
            | ParseError::UnexpectedChar { position, .. }
            | ParseError::InvalidNumber { position }
            | ParseError::UnknownIdentifier { position }
            | ParseError::UnknownFunction { position }
            | ParseError::ArgumentCount { position, .. }
            | ParseError::UnmatchedParenthesis { position }
            | ParseError::TrailingInput { position }
            | ParseError::NestingTooDeep { position } => Some(position),
            ParseError::OutOfMemory { .. } => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedEnd { position } => {
                write!(f, "Unexpected end of input at position {}", position)
            }
            ParseError::UnexpectedChar { position, found } => {
                if found.is_ascii_graphic() {
                    write!(f, "Unexpected '{}' at position {}", *found as char, position)
                } else {
                    write!(f, "Unexpected byte 0x{:02x} at position {}", found, position)
                }
            }
            ParseError::InvalidNumber { position } => {
                write!(f, "Invalid number at position {}", position)
            }
            ParseError::UnknownIdentifier { position } => {
                write!(f, "Unknown identifier at position {}", position)
            }
            ParseError::UnknownFunction { position } => {
                write!(f, "Unknown function at position {}", position)
            }
            ParseError::ArgumentCount {
                function,
                expected,
                position,
            } => write!(
                f,
                "Invalid call to '{}': expected {} arguments (position {})",
                function, expected, position
            ),
            ParseError::UnmatchedParenthesis { position } => {
                write!(f, "Unmatched parenthesis at position {}", position)
            }
            ParseError::TrailingInput { position } => {
                write!(f, "Unexpected trailing input at position {}", position)
            }
            ParseError::NestingTooDeep { position } => {
                write!(f, "Nesting too deep at position {}", position)
            }
            ParseError::OutOfMemory { capacity } => {
                write!(f, "Out of memory: all {} nodes in use", capacity)
            }
        }
    }
}

impl core::error::Error for ParseError {}

impl ParseError {
    /// Maps a float scan failure at `position` into a parse error.
    pub(crate) fn from_float(_: ParseFloatError, position: usize) -> Self {
        ParseError::InvalidNumber { position }
    }
}
