//! Error and warning types.
//!
//! Lexing and parsing distinguish fatal errors from recoverable problems:
//! - [`LexError`] and [`ParseError`] abort the call.
//! - [`ParseWarning`] and [`NormalizationFallback`] are collected into
//!   [`Warning`]s and returned next to the (possibly partial) stylesheet.

use core::fmt;

use serde::Serialize;

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal lexer failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    /// The input is not valid UTF-8.
    #[error("invalid UTF-8 sequence at byte {offset}")]
    InvalidUtf8 {
        /// Byte offset of the first invalid sequence.
        offset: usize,
    },
}

/// Fatal parser failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Blocks are nested deeper than [`ParseOptions::max_depth`](crate::ParseOptions::max_depth).
    #[error("blocks nested deeper than {limit} levels at byte {offset}")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
        /// Byte offset of the `{` that exceeded it.
        offset: usize,
    },

    /// A recoverable problem, promoted to an error by strict parsing.
    #[error("{0}")]
    Strict(ParseWarning),
}

/// Any fatal error returned by [`parse`](crate::parse).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The lexer failed.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// The parser failed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// A recoverable structural problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParseWarning {
    /// The input ended before a block's closing `}`.
    #[error("unterminated block `{key}` opened at byte {offset}")]
    UnterminatedBlock {
        /// Key of the block that was left open.
        key: String,
        /// Byte offset of its opening `{`.
        offset: usize,
    },

    /// A `}` with no open block.
    #[error("unexpected `}}` at byte {offset}")]
    UnexpectedCloseBrace {
        /// Byte offset of the brace.
        offset: usize,
    },

    /// A statement with a `:` whose property name is not an identifier.
    #[error("malformed declaration `{text}` at byte {offset}")]
    MalformedDeclaration {
        /// The statement text.
        text: String,
        /// Byte offset of the statement.
        offset: usize,
    },

    /// A block-less `@keyword` statement that is neither a known at-rule
    /// nor a variable definition.
    #[error("unknown at-rule `@{keyword}` at byte {offset}")]
    UnknownAtRule {
        /// The keyword without `@`.
        keyword: String,
        /// Byte offset of the `@`.
        offset: usize,
    },
}

/// Why a value component could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackReason {
    /// `@name` refers to a variable that was never defined.
    UndefinedVariable,
    /// Variable references form a cycle (or nest too deeply).
    VariableCycle,
    /// Expanding a variable would produce more than
    /// [`MAX_SUBSTITUTION_TOKENS`](crate::values::MAX_SUBSTITUTION_TOKENS) tokens.
    ExpansionLimit,
    /// A function call without its closing `)`, or a stray `)`.
    UnbalancedParens,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UndefinedVariable => "undefined variable",
            Self::VariableCycle => "variable cycle",
            Self::ExpansionLimit => "variable expansion too large",
            Self::UnbalancedParens => "unbalanced parentheses",
        })
    }
}

/// A value component that degraded to [`Value::Raw`](crate::Value::Raw).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{reason} in `{property}`: `{raw}` kept as raw text")]
pub struct NormalizationFallback {
    /// The declaration's property name as written.
    pub property: String,
    /// The source text that was kept unresolved.
    pub raw: String,
    /// Why resolution failed.
    pub reason: FallbackReason,
}

/// A recoverable problem returned alongside a parsed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(untagged)]
pub enum Warning {
    /// Structural problem.
    #[error(transparent)]
    Parse(#[from] ParseWarning),
    /// Value that degraded to raw text.
    #[error(transparent)]
    Fallback(#[from] NormalizationFallback),
}
