//! Buffered token stream with lookahead for the parser.

use std::collections::VecDeque;

use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::error::LexError;

/// Buffers tokens from a [`Lexer`] so the parser can look ahead.
///
/// The parser needs one token of lookahead for most decisions and two for
/// a few (`@` followed by an identifier, an identifier followed by `:`);
/// the buffer grows on demand so any depth works.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<Token>,
    /// Byte offset just past the last token handed out
    offset: usize,
}

impl<'a> TokenStream<'a> {
    /// Wrap a lexer.
    #[must_use]
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            buffer: VecDeque::new(),
            offset: 0,
        }
    }

    /// Look at the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Propagates a [`LexError`] from the underlying lexer.
    pub fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        self.peek_nth(0)
    }

    /// Look `n` tokens ahead (`0` is the next token).
    ///
    /// # Errors
    ///
    /// Propagates a [`LexError`] from the underlying lexer.
    pub fn peek_nth(&mut self, n: usize) -> Result<Option<&Token>, LexError> {
        self.fill(n + 1)?;
        Ok(self.buffer.get(n))
    }

    /// Kind of the `n`th token ahead, if any.
    ///
    /// # Errors
    ///
    /// Propagates a [`LexError`] from the underlying lexer.
    pub fn peek_kind(&mut self, n: usize) -> Result<Option<TokenKind>, LexError> {
        Ok(self.peek_nth(n)?.map(|token| token.kind))
    }

    /// Consume the next token.
    ///
    /// # Errors
    ///
    /// Propagates a [`LexError`] from the underlying lexer.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.fill(1)?;
        let token = self.buffer.pop_front();
        if let Some(token) = &token {
            self.offset = token.span.end;
        }
        Ok(token)
    }

    /// Consume whitespace tokens.
    ///
    /// # Errors
    ///
    /// Propagates a [`LexError`] from the underlying lexer.
    pub fn skip_whitespace(&mut self) -> Result<(), LexError> {
        while self.peek()?.is_some_and(Token::is_whitespace) {
            let _ = self.next_token()?;
        }
        Ok(())
    }

    /// Returns true once every token has been consumed.
    ///
    /// # Errors
    ///
    /// Propagates a [`LexError`] from the underlying lexer.
    pub fn is_exhausted(&mut self) -> Result<bool, LexError> {
        Ok(self.peek()?.is_none())
    }

    /// Byte offset just past the last consumed token.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    fn fill(&mut self, len: usize) -> Result<(), LexError> {
        while self.buffer.len() < len {
            match self.lexer.next() {
                Some(token) => self.buffer.push_back(token?),
                None => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookahead_does_not_consume() {
        let mut stream = TokenStream::new(Lexer::new("a b"));
        assert_eq!(stream.peek_kind(2).unwrap(), Some(TokenKind::Ident));
        assert_eq!(stream.peek_kind(0).unwrap(), Some(TokenKind::Ident));
        let first = stream.next_token().unwrap().unwrap();
        assert_eq!(first.text, "a");
        assert_eq!(stream.offset(), 1);
        stream.skip_whitespace().unwrap();
        assert_eq!(stream.next_token().unwrap().unwrap().text, "b");
        assert!(stream.is_exhausted().unwrap());
    }

    #[test]
    fn test_peek_past_end() {
        let mut stream = TokenStream::new(Lexer::new("a"));
        assert!(stream.peek_nth(5).unwrap().is_none());
    }

    #[test]
    fn test_lex_error_surfaces_through_stream() {
        let mut stream = TokenStream::new(Lexer::from_bytes(b"a\xff"));
        assert_eq!(stream.next_token().unwrap().unwrap().text, "a");
        assert_eq!(stream.next_token(), Err(LexError::InvalidUtf8 { offset: 1 }));
    }
}
