use super::token::{Token, TokenKind};
use crate::error::LexError;

/// At-keywords recognized by the lexer, matched case-insensitively against
/// the whole identifier that follows `@`.
const AT_KEYWORDS: &[(&str, TokenKind)] = &[
    ("charset", TokenKind::Charset),
    ("import", TokenKind::Import),
    ("page", TokenKind::Page),
    ("media", TokenKind::Media),
    ("font-face", TokenKind::FontFace),
    ("namespace", TokenKind::Namespace),
];

/// Unit suffixes with a dedicated numeric category. Anything else after a
/// number is a `DIMEN`.
const UNITS: &[(&str, TokenKind)] = &[
    ("em", TokenKind::Ems),
    ("ex", TokenKind::Exs),
    ("px", TokenKind::Length),
    ("cm", TokenKind::Length),
    ("mm", TokenKind::Length),
    ("in", TokenKind::Length),
    ("pt", TokenKind::Length),
    ("pc", TokenKind::Length),
    ("deg", TokenKind::Angle),
    ("rad", TokenKind::Angle),
    ("grad", TokenKind::Angle),
    ("ms", TokenKind::Time),
    ("s", TokenKind::Time),
    ("hz", TokenKind::Freq),
    ("khz", TokenKind::Freq),
];

/// Lexer for LESS/CSS source text.
///
/// The lexer is a lazy iterator: each call to [`Iterator::next`] scans one
/// token. Comments are skipped and never produced. Every character of the
/// input is consumed by some token because the `UNKNOWN` category accepts
/// any single character, so the only possible error is an invalid UTF-8
/// sequence when lexing raw bytes (see [`Lexer::from_bytes`]).
///
/// To lex the same input again, construct a new lexer.
pub struct Lexer<'a> {
    /// The (valid UTF-8) source being tokenized
    source: &'a str,
    /// Characters of `source` with their byte offsets
    input: Vec<(usize, char)>,
    /// Current position in `input`
    position: usize,
    /// Byte offset of the first invalid UTF-8 sequence, if any
    encoding_error: Option<usize>,
    /// Set once the iterator has yielded its final item
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over UTF-8 text.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.char_indices().collect(),
            position: 0,
            encoding_error: None,
            finished: false,
        }
    }

    /// Create a lexer over raw bytes.
    ///
    /// Tokens are produced for the valid UTF-8 prefix of `bytes`; if the
    /// input contains an invalid sequence, the lexer then yields a single
    /// [`LexError::InvalidUtf8`] and stops.
    #[must_use]
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(source) => Self::new(source),
            Err(error) => {
                let valid = error.valid_up_to();
                let source = std::str::from_utf8(&bytes[..valid]).unwrap_or_default();
                let mut lexer = Self::new(source);
                lexer.encoding_error = Some(valid);
                lexer
            }
        }
    }

    /// Lex the whole input into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first [`LexError`] encountered.
    pub fn tokenize(self) -> Result<Vec<Token>, LexError> {
        self.collect()
    }

    /// Scan one token starting at the current position.
    ///
    /// The caller guarantees the input is not exhausted.
    fn consume_token(&mut self) -> TokenKind {
        let Some(c) = self.consume() else {
            return TokenKind::Unknown;
        };

        match c {
            c if is_whitespace(c) => {
                self.consume_whitespace();
                TokenKind::S
            }

            '"' | '\'' => self.consume_string_token(c),

            '#' => {
                if self.peek().is_some_and(is_name_code_point) || self.is_valid_escape_at(0) {
                    let _ = self.consume_name();
                    TokenKind::Hash
                } else {
                    TokenKind::Unknown
                }
            }

            '@' => self.consume_at_keyword(),

            '!' => {
                if self.peek() == Some('=') {
                    let _ = self.consume();
                    TokenKind::DashMatch
                } else {
                    self.consume_important()
                }
            }

            '<' => {
                if self.peek() == Some('!') && self.peek_at(1) == Some('-') && self.peek_at(2) == Some('-')
                {
                    self.advance(3);
                    TokenKind::Cdo
                } else {
                    TokenKind::Unknown
                }
            }

            '~' | '|' if self.peek() == Some('=') => {
                let _ = self.consume();
                if c == '~' {
                    TokenKind::Includes
                } else {
                    TokenKind::DashMatch
                }
            }

            '+' | '.' => {
                if self.would_start_number(c) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    TokenKind::Unknown
                }
            }

            '-' => {
                if self.would_start_number(c) {
                    self.reconsume();
                    self.consume_numeric_token()
                } else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    self.advance(2);
                    TokenKind::Cdc
                } else if self.would_start_ident('-', 0) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    TokenKind::Unknown
                }
            }

            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            'u' | 'U' if self.would_start_unicode_range() => self.consume_unicode_range(),

            '\\' => {
                if self.is_valid_escape_at(0) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    TokenKind::Unknown
                }
            }

            c if is_name_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            _ => TokenKind::Unknown,
        }
    }

    /// Skip any number of consecutive `/* ... */` comments.
    ///
    /// An unterminated comment runs to the end of the input.
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.advance(2);
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        let _ = self.consume();
                        break;
                    }
                    Some(_) => {}
                    None => break,
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// Scan a quoted string after its opening quote.
    ///
    /// Without a closing quote before an unescaped newline or the end of
    /// input, only the opening quote is consumed and it becomes `UNKNOWN`.
    fn consume_string_token(&mut self, quote: char) -> TokenKind {
        let after_quote = self.position;
        loop {
            match self.consume() {
                Some(c) if c == quote => return TokenKind::String,
                Some('\\') => {
                    // An escaped newline continues the string; any other escaped
                    // code point is kept verbatim in the lexeme.
                    if self.consume().is_none() {
                        break;
                    }
                }
                Some('\n' | '\r' | '\x0C') | None => break,
                Some(_) => {}
            }
        }
        self.position = after_quote;
        TokenKind::Unknown
    }

    /// `@` was consumed. Returns the at-keyword kind, or `UNKNOWN` for the
    /// bare `@` when the identifier is not one of the fixed at-keywords.
    fn consume_at_keyword(&mut self) -> TokenKind {
        if !self.would_start_ident_here() {
            return TokenKind::Unknown;
        }
        let after_at = self.position;
        let name = self.consume_name();
        if let Some(&(_, kind)) = AT_KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(&name))
        {
            return kind;
        }
        self.position = after_at;
        TokenKind::Unknown
    }

    /// `!` was consumed. Whitespace and comments may separate it from
    /// `important`.
    fn consume_important(&mut self) -> TokenKind {
        let after_bang = self.position;
        loop {
            self.consume_comments();
            if !self.peek().is_some_and(is_whitespace) {
                break;
            }
            self.consume_whitespace();
        }

        let word: String = (0..9).filter_map(|i| self.peek_at(i)).collect();
        if word.eq_ignore_ascii_case("important") && !self.peek_at(9).is_some_and(is_name_code_point) {
            self.advance(9);
            TokenKind::Important
        } else {
            self.position = after_bang;
            TokenKind::Unknown
        }
    }

    /// Scan a number and its unit suffix.
    fn consume_numeric_token(&mut self) -> TokenKind {
        self.consume_number();

        if self.would_start_ident_here() {
            let unit = self.consume_name();
            UNITS
                .iter()
                .find(|(suffix, _)| suffix.eq_ignore_ascii_case(&unit))
                .map_or(TokenKind::Dimension, |&(_, kind)| kind)
        } else if self.peek() == Some('%') {
            let _ = self.consume();
            TokenKind::Percentage
        } else {
            TokenKind::Number
        }
    }

    /// `[+-]?([0-9]+|[0-9]*\.[0-9]+)`
    fn consume_number(&mut self) {
        if matches!(self.peek(), Some('+' | '-')) {
            let _ = self.consume();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let _ = self.consume();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            let _ = self.consume();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                let _ = self.consume();
            }
        }
    }

    /// Scan an identifier, then decide between `URI`, `FUNCTION` and `IDENT`.
    fn consume_ident_like_token(&mut self) -> TokenKind {
        let name = self.consume_name();

        if self.peek() != Some('(') {
            return TokenKind::Ident;
        }

        if name.eq_ignore_ascii_case("url") {
            let before_paren = self.position;
            let _ = self.consume();
            if self.consume_url_body() {
                return TokenKind::Uri;
            }
            self.position = before_paren;
        }

        let _ = self.consume();
        TokenKind::Function
    }

    /// Consume the inside of `url(` through its closing `)`.
    ///
    /// Returns false (leaving the position wherever it stopped) when the body
    /// is not a well-formed URI.
    fn consume_url_body(&mut self) -> bool {
        self.consume_whitespace();

        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let _ = self.consume();
                if self.consume_string_token(quote) != TokenKind::String {
                    return false;
                }
            }
            _ => loop {
                match self.peek() {
                    Some(')') | None => break,
                    Some(c) if is_whitespace(c) => break,
                    Some('"' | '\'' | '(') => return false,
                    Some('\\') => {
                        if !self.is_valid_escape_at(0) {
                            return false;
                        }
                        let _ = self.consume();
                        self.consume_escape();
                    }
                    Some(_) => {
                        let _ = self.consume();
                    }
                }
            },
        }

        self.consume_whitespace();
        if self.peek() == Some(')') {
            let _ = self.consume();
            true
        } else {
            false
        }
    }

    /// `u`/`U` was consumed and `+` plus a hex digit or `?` follows.
    fn consume_unicode_range(&mut self) -> TokenKind {
        let _ = self.consume(); // +
        let mut digits = 0;
        while digits < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            let _ = self.consume();
            digits += 1;
        }

        let mut wildcard = false;
        while digits < 6 && self.peek() == Some('?') {
            let _ = self.consume();
            digits += 1;
            wildcard = true;
        }

        if !wildcard && self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| c.is_ascii_hexdigit()) {
            let _ = self.consume(); // -
            let mut end_digits = 0;
            while end_digits < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                let _ = self.consume();
                end_digits += 1;
            }
        }
        TokenKind::UnicodeRange
    }

    /// Consume name code points and escapes, returning the name with escapes
    /// left as written.
    fn consume_name(&mut self) -> String {
        let start = self.byte_offset(self.position);
        loop {
            match self.peek() {
                Some(c) if is_name_code_point(c) => {
                    let _ = self.consume();
                }
                Some('\\') if self.is_valid_escape_at(0) => {
                    let _ = self.consume();
                    self.consume_escape();
                }
                _ => break,
            }
        }
        self.source[start..self.byte_offset(self.position)].to_string()
    }

    /// Consume the code points of an escape after its backslash: up to six
    /// hex digits plus one optional whitespace, or any single code point.
    fn consume_escape(&mut self) {
        if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            let mut digits = 0;
            while digits < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                let _ = self.consume();
                digits += 1;
            }
            if self.peek().is_some_and(is_whitespace) {
                let _ = self.consume();
            }
        } else {
            let _ = self.consume();
        }
    }

    /// A backslash at `offset` followed by anything but a newline or EOF.
    fn is_valid_escape_at(&self, offset: usize) -> bool {
        self.peek_at(offset) == Some('\\')
            && !matches!(self.peek_at(offset + 1), None | Some('\n' | '\r' | '\x0C'))
    }

    fn would_start_ident_here(&self) -> bool {
        match self.peek() {
            Some(c) => self.would_start_ident(c, 1),
            None => false,
        }
    }

    /// Would `first`, followed by the input at `offset`, start an identifier?
    fn would_start_ident(&self, first: char, offset: usize) -> bool {
        match first {
            '-' => {
                let second = self.peek_at(offset);
                second.is_some_and(|c| is_name_start_code_point(c) || c == '-')
                    || self.is_valid_escape_at(offset)
            }
            '\\' => !matches!(self.peek_at(offset), None | Some('\n' | '\r' | '\x0C')),
            c => is_name_start_code_point(c),
        }
    }

    /// `first` was just consumed; does it begin a number together with what
    /// follows?
    fn would_start_number(&self, first: char) -> bool {
        let digit_at = |offset| self.peek_at(offset).is_some_and(|c: char| c.is_ascii_digit());
        match first {
            '+' | '-' => digit_at(0) || (self.peek() == Some('.') && digit_at(1)),
            '.' => digit_at(0),
            c => c.is_ascii_digit(),
        }
    }

    fn would_start_unicode_range(&self) -> bool {
        self.peek() == Some('+') && self.peek_at(1).is_some_and(|c| c.is_ascii_hexdigit() || c == '?')
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.input
            .get(index)
            .map_or(self.source.len(), |&(offset, _)| offset)
    }

    /// Consume and return the next character.
    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    fn advance(&mut self, count: usize) {
        self.position = (self.position + count).min(self.input.len());
    }

    /// Put back the last consumed character.
    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).map(|&(_, c)| c)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.consume_comments();

        if self.position >= self.input.len() {
            self.finished = true;
            return self
                .encoding_error
                .map(|offset| Err(LexError::InvalidUtf8 { offset }));
        }

        let start = self.byte_offset(self.position);
        let kind = self.consume_token();
        let end = self.byte_offset(self.position);
        Some(Ok(Token::new(kind, &self.source[start..end], start..end)))
    }
}

/// Space, tab, and the newline characters.
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// `[_a-zA-Z]` or any non-ASCII code point.
fn is_name_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// A name-start code point, a digit, or `-`.
fn is_name_code_point(c: char) -> bool {
    is_name_start_code_point(c) || c.is_ascii_digit() || c == '-'
}
