//! Function-argument extraction over token runs.

use crate::lexer::{Lexer, Token, TokenKind};

/// Returns true if `token` opens a parenthesized group.
fn opens_group(token: &Token) -> bool {
    token.kind == TokenKind::Function || token.is_delim('(')
}

/// Index of the `)` that closes the group opened by `tokens[0]`.
///
/// `tokens[0]` must be a `FUNCTION` token or `(`. Returns `None` when the
/// group is never closed.
#[must_use]
pub fn matching_paren(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        if opens_group(token) {
            depth += 1;
        } else if token.is_delim(')') {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Drop leading and trailing whitespace tokens.
#[must_use]
pub fn trim_whitespace(tokens: &[Token]) -> &[Token] {
    let start = tokens.iter().position(|t| !t.is_whitespace()).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| !t.is_whitespace()).map_or(start, |i| i + 1);
    &tokens[start..end]
}

/// Split a token run on commas that are not inside parentheses.
///
/// Each part is trimmed of whitespace. An empty run yields no parts.
#[must_use]
pub fn split_top_level_commas(tokens: &[Token]) -> Vec<&[Token]> {
    if trim_whitespace(tokens).is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        if opens_group(token) {
            depth += 1;
        } else if token.is_delim(')') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_delim(',') {
            parts.push(trim_whitespace(&tokens[start..index]));
            start = index + 1;
        }
    }
    parts.push(trim_whitespace(&tokens[start..]));
    parts
}

/// Arguments of a complete function call.
///
/// `tokens` must be exactly a `FUNCTION` token through its matching `)`.
/// Returns `None` for anything else, including an unclosed call.
#[must_use]
pub fn function_arguments(tokens: &[Token]) -> Option<Vec<&[Token]>> {
    let first = tokens.first()?;
    if first.kind != TokenKind::Function || matching_paren(tokens)? != tokens.len() - 1 {
        return None;
    }
    Some(split_top_level_commas(&tokens[1..tokens.len() - 1]))
}

/// Arguments of a function call written as text, e.g. `rgba(0, 0, 0, .5)`.
///
/// Each argument is returned as its source text with surrounding whitespace
/// removed. Returns `None` if `value` is not a single function call.
#[must_use]
pub fn argument_list(value: &str) -> Option<Vec<String>> {
    let tokens = Lexer::new(value.trim()).tokenize().ok()?;
    let args = function_arguments(&tokens)?;
    Some(
        args.iter()
            .map(|arg| arg.iter().map(|token| token.text.as_str()).collect())
            .collect(),
    )
}
