//! Identifier keyword resolution.

use std::str::FromStr;

use crate::values::{Color, GlobalKeyword, Keyword};

/// Resolve an identifier used as a value.
///
/// Lookup order: CSS-wide keywords, booleans, named colors. Anything else is
/// kept as a plain identifier. Matching is case-insensitive; the name is
/// kept as written.
#[must_use]
pub fn parse_keyword(ident: &str) -> Keyword {
    if let Ok(global) = GlobalKeyword::from_str(ident) {
        return Keyword::Global(global);
    }

    let lower = ident.to_ascii_lowercase();
    match lower.as_str() {
        "true" | "yes" => {
            return Keyword::Boolean {
                name: ident.to_string(),
                value: true,
            };
        }
        "false" | "no" => {
            return Keyword::Boolean {
                name: ident.to_string(),
                value: false,
            };
        }
        _ => {}
    }

    match Color::from_named(&lower) {
        Some(color) => Keyword::Color {
            name: ident.to_string(),
            color,
        },
        None => Keyword::Ident(ident.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword() {
        assert_eq!(parse_keyword("INHERIT"), Keyword::Global(GlobalKeyword::Inherit));
        assert_eq!(
            parse_keyword("Yes"),
            Keyword::Boolean {
                name: "Yes".to_string(),
                value: true
            }
        );
        assert_eq!(
            parse_keyword("red"),
            Keyword::Color {
                name: "red".to_string(),
                color: Color::rgb(255, 0, 0)
            }
        );
        assert_eq!(parse_keyword("no-repeat"), Keyword::Ident("no-repeat".to_string()));
    }
}
