//! LESS lexer module.

/// Lexer implementation.
pub mod lexer;
/// Buffered token stream with lookahead.
pub mod stream;
/// Token kinds and tokens.
pub mod token;

pub use lexer::Lexer;
pub use stream::TokenStream;
pub use token::{Token, TokenKind};

/// Tokenize `source` completely.
///
/// # Errors
///
/// Never fails for `&str` input; the signature matches [`Lexer::tokenize`]
/// so byte-oriented callers can share code.
pub fn tokenize(source: &str) -> Result<Vec<Token>, crate::error::LexError> {
    Lexer::new(source).tokenize()
}
