//! Token types produced by the LESS lexer.
//!
//! Every token keeps the exact lexeme it was scanned from, so the parser can
//! rebuild selector text and the normalizer can fall back to the raw source
//! of a value without re-reading the input.

use core::fmt;
use core::ops::Range;

use strum_macros::{EnumIter, IntoStaticStr};

/// The lexical category of a [`Token`].
///
/// The static names (`CHARSET_SYM`, `S`, `IDENT`, ...) form the lexer's
/// token-name table; they are fixed at compile time and available through
/// [`TokenKind::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, EnumIter)]
pub enum TokenKind {
    /// `@charset`
    #[strum(serialize = "CHARSET_SYM")]
    Charset,
    /// `@import`
    #[strum(serialize = "IMPORT_SYM")]
    Import,
    /// `@page`
    #[strum(serialize = "PAGE_SYM")]
    Page,
    /// `@media`
    #[strum(serialize = "MEDIA_SYM")]
    Media,
    /// `@font-face`
    #[strum(serialize = "FONT_FACE_SYM")]
    FontFace,
    /// `@namespace`
    #[strum(serialize = "NAMESPACE_SYM")]
    Namespace,
    /// `!important`, whitespace allowed after the `!`
    #[strum(serialize = "IMPORTANT_SYM")]
    Important,

    /// A run of whitespace
    #[strum(serialize = "S")]
    S,
    /// A quoted string, quotes included in the lexeme
    #[strum(serialize = "STRING")]
    String,
    /// An identifier
    #[strum(serialize = "IDENT")]
    Ident,
    /// `#` followed by name characters
    #[strum(serialize = "HASH")]
    Hash,
    /// `<!--`
    #[strum(serialize = "CDO")]
    Cdo,
    /// `-->`
    #[strum(serialize = "CDC")]
    Cdc,
    /// `~=`
    #[strum(serialize = "INCLUDES")]
    Includes,
    /// `|=` (and the legacy `!=` spelling)
    #[strum(serialize = "DASHMATCH")]
    DashMatch,

    /// A number with an `em` suffix
    #[strum(serialize = "EMS")]
    Ems,
    /// A number with an `ex` suffix
    #[strum(serialize = "EXS")]
    Exs,
    /// A number with a `px`, `cm`, `mm`, `in`, `pt` or `pc` suffix
    #[strum(serialize = "LENGTH")]
    Length,
    /// A number with a `deg`, `rad` or `grad` suffix
    #[strum(serialize = "ANGLE")]
    Angle,
    /// A number with a `ms` or `s` suffix
    #[strum(serialize = "TIME")]
    Time,
    /// A number with a `Hz` or `kHz` suffix
    #[strum(serialize = "FREQ")]
    Freq,
    /// A number followed by any other identifier
    #[strum(serialize = "DIMEN")]
    Dimension,
    /// A number followed by `%`
    #[strum(serialize = "PERCENTAGE")]
    Percentage,
    /// A bare number
    #[strum(serialize = "NUMBER")]
    Number,

    /// `url(...)` through the closing parenthesis
    #[strum(serialize = "URI")]
    Uri,
    /// An identifier immediately followed by `(`; the lexeme includes the `(`
    #[strum(serialize = "FUNCTION")]
    Function,

    /// `U+` followed by a hex range
    #[strum(serialize = "UNICODERANGE")]
    UnicodeRange,
    /// Any other single character
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

impl TokenKind {
    /// The static name of this kind, e.g. `"LENGTH"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns true for the fixed at-keyword kinds (`@media`, `@import`, ...).
    #[must_use]
    pub const fn is_at_keyword(self) -> bool {
        matches!(
            self,
            Self::Charset | Self::Import | Self::Page | Self::Media | Self::FontFace | Self::Namespace
        )
    }

    /// Returns true for every kind that carries a numeric magnitude.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Ems
                | Self::Exs
                | Self::Length
                | Self::Angle
                | Self::Time
                | Self::Freq
                | Self::Dimension
                | Self::Percentage
                | Self::Number
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single lexeme with its category and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The lexical category.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: String,
    /// Byte range of the lexeme in the source text.
    pub span: Range<usize>,
}

impl Token {
    /// Create a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::S)
    }

    /// Returns true if this is the single-character `UNKNOWN` token `c`.
    ///
    /// Structural punctuation (`{`, `}`, `:`, `;`, `,`, `(`, `)`) reaches the
    /// parser this way.
    #[must_use]
    pub fn is_delim(&self, c: char) -> bool {
        self.kind == TokenKind::Unknown && self.text.chars().eq(core::iter::once(c))
    }

    /// The function name of a `FUNCTION` token, without the trailing `(`.
    #[must_use]
    pub fn function_name(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Function => self.text.strip_suffix('('),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{:?}>", self.kind, self.text)
    }
}
