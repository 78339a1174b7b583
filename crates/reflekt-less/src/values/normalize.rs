//! Token runs to [`Value`]s, and declaration lists to resolved declarations.

use std::collections::HashMap;

use super::color::{Color, color_from_function};
use super::substitute::{VariableScope, substitute_variables};
use super::value::{Number, Unit, Value};
use crate::error::{FallbackReason, NormalizationFallback};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::parser::RawDeclaration;
use crate::stylesheet::Declaration;
use crate::util::{
    function_arguments, matching_paren, parse_keyword, prefix_rank, split_top_level_commas,
    strip_vendor_prefix, to_camel_case, trim_whitespace, unescape, unquote,
};

/// The logical key of a property: vendor prefix removed, camelCased.
///
/// Custom properties (`--name`) are kept verbatim.
#[must_use]
pub fn declaration_key(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    to_camel_case(strip_vendor_prefix(&property.to_ascii_lowercase()))
}

/// Normalize a value written as text, without variables.
///
/// Fallbacks are discarded; use [`resolve_value`] to collect them.
#[must_use]
pub fn normalize_value(text: &str) -> Value {
    let tokens = tokenize(text).unwrap_or_default();
    resolve_value("", &tokens, &VariableScope::new(), &mut Vec::new())
}

/// Resolve the raw tokens of one declaration value.
///
/// Variables are substituted first. Components that cannot be resolved are
/// kept as [`Value::Raw`] and reported in `fallbacks`.
pub fn resolve_value(
    property: &str,
    tokens: &[Token],
    scope: &VariableScope<'_>,
    fallbacks: &mut Vec<NormalizationFallback>,
) -> Value {
    let (tokens, unresolved) = substitute_variables(tokens, scope);
    fallbacks.extend(unresolved.into_iter().map(|u| NormalizationFallback {
        property: property.to_string(),
        raw: u.raw,
        reason: u.reason,
    }));

    let mut resolver = Resolver { property, fallbacks };
    let mut groups: Vec<Value> = split_top_level_commas(&tokens)
        .into_iter()
        .map(|group| resolver.components(group))
        .collect();

    match groups.len() {
        0 => Value::Raw(String::new()),
        1 => groups.swap_remove(0),
        _ => Value::CommaList(groups),
    }
}

/// Resolve a block's declarations.
///
/// Declarations sharing a logical key form one group placed where the first
/// of them appeared. Members are applied vendor-prefixed first, so the plain
/// property wins, and a later non-important member never replaces an
/// important one.
pub(crate) fn resolve_declarations(
    raw: &[RawDeclaration],
    scope: &VariableScope<'_>,
    fallbacks: &mut Vec<NormalizationFallback>,
) -> Vec<Declaration> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&RawDeclaration>> = HashMap::new();
    for declaration in raw {
        let key = declaration_key(&declaration.property);
        groups
            .entry(key)
            .or_insert_with_key(|key| {
                order.push(key.clone());
                Vec::new()
            })
            .push(declaration);
    }

    let mut resolved = Vec::with_capacity(order.len());
    for key in order {
        let Some(mut members) = groups.remove(&key) else {
            continue;
        };
        members.sort_by_key(|member| prefix_rank(&member.property));

        let mut current: Option<Declaration> = None;
        for member in members {
            if current.as_ref().is_some_and(|c| c.important && !member.important) {
                continue;
            }
            current = Some(Declaration {
                property: member.property.clone(),
                key: key.clone(),
                value: resolve_value(&member.property, &member.value, scope, fallbacks),
                important: member.important,
            });
        }
        resolved.extend(current);
    }
    resolved
}

struct Resolver<'r> {
    property: &'r str,
    fallbacks: &'r mut Vec<NormalizationFallback>,
}

impl Resolver<'_> {
    /// One comma-free run: a single component or a space-separated list.
    fn components(&mut self, tokens: &[Token]) -> Value {
        let tokens = trim_whitespace(tokens);
        let mut values = Vec::new();
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];
            if token.is_whitespace() {
                index += 1;
                continue;
            }

            if token.kind == TokenKind::Function || token.is_delim('(') {
                let Some(close) = matching_paren(&tokens[index..]) else {
                    values.push(self.fallback(&tokens[index..], FallbackReason::UnbalancedParens));
                    break;
                };
                let group = &tokens[index..=index + close];
                values.push(if token.kind == TokenKind::Function {
                    self.function(group)
                } else {
                    Value::Raw(join_text(group))
                });
                index += close + 1;
                continue;
            }

            if token.is_delim(')') {
                values.push(self.fallback(core::slice::from_ref(token), FallbackReason::UnbalancedParens));
            } else {
                values.push(resolve_token(token));
            }
            index += 1;
        }

        match values.len() {
            0 => Value::Raw(String::new()),
            1 => values.swap_remove(0),
            _ => Value::List(values),
        }
    }

    /// A complete call, `FUNCTION` through its `)`.
    fn function(&mut self, call: &[Token]) -> Value {
        let name = call[0].function_name().unwrap_or_default().to_string();
        let args: Vec<Value> = function_arguments(call)
            .unwrap_or_default()
            .into_iter()
            .map(|arg| self.components(arg))
            .collect();

        if name.eq_ignore_ascii_case("url") {
            if let [Value::String(target)] = args.as_slice() {
                return Value::Url(target.clone());
            }
        }
        if let Some(color) = color_from_function(&name, &args) {
            return Value::Color(color);
        }
        Value::Function { name, args }
    }

    fn fallback(&mut self, tokens: &[Token], reason: FallbackReason) -> Value {
        let raw = join_text(tokens);
        self.fallbacks.push(NormalizationFallback {
            property: self.property.to_string(),
            raw: raw.clone(),
            reason,
        });
        Value::Raw(raw)
    }
}

/// A single token that is not part of a parenthesized group.
fn resolve_token(token: &Token) -> Value {
    let text = token.text.as_str();
    match token.kind {
        TokenKind::String => Value::String(unquote(text)),
        kind if kind.is_numeric() => parse_number(text).map_or_else(|| Value::Raw(text.to_string()), Value::Number),
        TokenKind::Hash => {
            let name = &text[1..];
            Color::from_hex(name).map_or_else(|| Value::Hash(unescape(name)), Value::Color)
        }
        TokenKind::Ident => Value::Keyword(parse_keyword(text)),
        TokenKind::Uri => Value::Url(uri_target(text)),
        TokenKind::UnicodeRange => Value::UnicodeRange(text.to_string()),
        _ => Value::Raw(text.to_string()),
    }
}

/// Split a numeric lexeme into its magnitude and unit.
fn parse_number(text: &str) -> Option<Number> {
    let mut end = 0;
    for (index, c) in text.char_indices() {
        let numeric = c.is_ascii_digit() || (index == 0 && matches!(c, '+' | '-')) || c == '.';
        if !numeric {
            break;
        }
        end = index + c.len_utf8();
    }
    let (magnitude, suffix) = text.split_at(end);
    let value = magnitude.parse::<f64>().ok()?;
    Some(Number::new(value, Unit::from_suffix(suffix)))
}

/// The target of a `url(...)` lexeme.
fn uri_target(text: &str) -> String {
    let inner = text.get(4..text.len().saturating_sub(1)).unwrap_or_default();
    let inner = inner.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C'));
    if inner.starts_with(['"', '\'']) {
        unquote(inner)
    } else {
        unescape(inner)
    }
}

fn join_text(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Keyword;

    #[test]
    fn test_declaration_key() {
        assert_eq!(declaration_key("font-size"), "fontSize");
        assert_eq!(declaration_key("-webkit-border-radius"), "borderRadius");
        assert_eq!(declaration_key("Background-Color"), "backgroundColor");
        assert_eq!(declaration_key("--main-color"), "--main-color");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12px"), Some(Number::new(12.0, Unit::Px)));
        assert_eq!(parse_number("-.5em"), Some(Number::new(-0.5, Unit::Em)));
        assert_eq!(parse_number("50%"), Some(Number::new(50.0, Unit::Percent)));
        assert_eq!(parse_number("+3"), Some(Number::new(3.0, Unit::None)));
        assert_eq!(parse_number("2e"), Some(Number::new(2.0, Unit::Other("e".to_string()))));
    }

    #[test]
    fn test_uri_target() {
        assert_eq!(uri_target("url(foo.png)"), "foo.png");
        assert_eq!(uri_target("URL( 'a b.png' )"), "a b.png");
        assert_eq!(uri_target(r"url(a\)b)"), "a)b");
    }

    #[test]
    fn test_unbalanced_function_falls_back() {
        let mut fallbacks = Vec::new();
        let tokens = tokenize("1px rgb(1, 2").unwrap();
        let value = resolve_value("color", &tokens, &VariableScope::new(), &mut fallbacks);
        assert_eq!(
            value,
            Value::List(vec![
                Value::Number(Number::new(1.0, Unit::Px)),
                Value::Raw("rgb(1, 2".to_string()),
            ])
        );
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].reason, FallbackReason::UnbalancedParens);
    }

    #[test]
    fn test_keywords_and_functions() {
        assert_eq!(
            normalize_value("translateX(10px)"),
            Value::Function {
                name: "translateX".to_string(),
                args: vec![Value::Number(Number::new(10.0, Unit::Px))],
            }
        );
        assert_eq!(normalize_value("rgba(0, 0, 0, 0)"), Value::Color(Color::TRANSPARENT));
        assert_eq!(
            normalize_value("bold"),
            Value::Keyword(Keyword::Ident("bold".to_string()))
        );
    }
}
