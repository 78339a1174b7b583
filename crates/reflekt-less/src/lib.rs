//! LESS/CSS stylesheet parser.
//!
//! Turns LESS-flavored stylesheet text into a [`Stylesheet`]: blocks keyed
//! by selector or at-rule, each holding camelCased property keys mapped to
//! typed [`Value`]s, plus nested blocks.
//!
//! ```
//! use reflekt_less::{Color, ParseOptions, RandomIds, parse_with};
//!
//! let options = ParseOptions::default().with_report_warnings(false);
//! let parsed = parse_with(".btn { color: #FF0000; font-size: 12px; }", &options, &mut RandomIds).unwrap();
//! let button = parsed.stylesheet.get(".btn").unwrap();
//! assert_eq!(button.get("color").and_then(|v| v.as_color()), Some(Color::rgb(255, 0, 0)));
//! assert_eq!(button.get("fontSize").unwrap().to_string(), "12px");
//! ```
//!
//! # Pipeline
//!
//! - [`lexer`]: text to tokens
//! - [`parser`]: tokens to a raw block tree
//! - [`values`]: raw value tokens to [`Value`]s, variables, property keys
//! - [`util`]: string, argument, keyword and id helpers

pub mod error;
pub mod lexer;
pub mod parser;
pub mod stylesheet;
pub mod util;
pub mod values;

use reflekt_common::warning::warn_once;
use serde::Serialize;

pub use error::{
    Error, FallbackReason, LexError, NormalizationFallback, ParseError, ParseWarning, Result, Warning,
};
pub use lexer::{Lexer, Token, TokenKind, TokenStream, tokenize};
pub use parser::{ParseOptions, Parser};
pub use stylesheet::{Block, BlockKind, Declaration, Stylesheet};
pub use util::{IdGenerator, RandomIds, SeededIds};
pub use values::{Color, GlobalKeyword, Keyword, Number, Unit, Value};

/// A stylesheet together with the recoverable problems found in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parsed {
    /// The resolved stylesheet.
    pub stylesheet: Stylesheet,
    /// Structural warnings first, then value fallbacks, each in source order.
    pub warnings: Vec<Warning>,
}

/// Parse with default options and random ids for anonymous blocks.
///
/// # Errors
///
/// Fails only when blocks nest deeper than
/// [`DEFAULT_MAX_DEPTH`](parser::DEFAULT_MAX_DEPTH).
pub fn parse(text: &str) -> Result<Parsed> {
    parse_with(text, &ParseOptions::default(), &mut RandomIds)
}

/// Parse with explicit options and id generator.
///
/// # Errors
///
/// Returns [`ParseError::NestingTooDeep`], or in strict mode
/// [`ParseError::Strict`] for the first structural warning.
pub fn parse_with(text: &str, options: &ParseOptions, ids: &mut dyn IdGenerator) -> Result<Parsed> {
    parse_lexer(Lexer::new(text), options, ids)
}

/// Parse raw bytes.
///
/// # Errors
///
/// Like [`parse_with`], plus [`LexError::InvalidUtf8`] when the input is
/// not UTF-8.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions, ids: &mut dyn IdGenerator) -> Result<Parsed> {
    parse_lexer(Lexer::from_bytes(bytes), options, ids)
}

fn parse_lexer(lexer: Lexer<'_>, options: &ParseOptions, ids: &mut dyn IdGenerator) -> Result<Parsed> {
    let tree = Parser::new(TokenStream::new(lexer), options, ids).parse()?;

    let mut fallbacks = Vec::new();
    let stylesheet = Stylesheet::from_tree(&tree, &mut fallbacks);

    let warnings: Vec<Warning> = tree
        .warnings
        .into_iter()
        .map(Warning::from)
        .chain(fallbacks.into_iter().map(Warning::from))
        .collect();

    if options.report_warnings {
        for warning in &warnings {
            let _ = warn_once("LESS", &warning.to_string());
        }
    }

    Ok(Parsed { stylesheet, warnings })
}
