//! LESS variable substitution.
//!
//! `@name` inside a value is replaced by the tokens of the closest visible
//! `@name: ...;` definition, recursively. Blocks open a new frame, so a
//! definition inside a block shadows an outer one for that block and its
//! children. Within one frame the last definition wins.

use crate::error::FallbackReason;
use crate::lexer::{Token, TokenKind};

/// Maximum nesting of variables that refer to other variables.
pub const MAX_SUBSTITUTION_DEPTH: usize = 32;

/// Maximum number of tokens one value may grow to through substitution.
///
/// A reference whose expansion crosses the limit is left unexpanded.
pub const MAX_SUBSTITUTION_TOKENS: usize = 4096;

/// A variable definition as written: `@name: tokens;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDef {
    /// Name without the `@`.
    pub name: String,
    /// Value tokens, trimmed of surrounding whitespace.
    pub tokens: Vec<Token>,
    /// Byte offset of the `@`.
    pub offset: usize,
}

/// The variable definitions visible from one block, outermost frame first.
#[derive(Debug, Clone, Default)]
pub struct VariableScope<'a> {
    frames: Vec<&'a [VariableDef]>,
}

impl<'a> VariableScope<'a> {
    /// A scope with no variables.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// This scope with `frame` added as the innermost level.
    #[must_use]
    pub fn with_frame(&self, frame: &'a [VariableDef]) -> Self {
        let mut frames = self.frames.clone();
        frames.push(frame);
        Self { frames }
    }

    /// The tokens of the innermost definition of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'a [Token]> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .iter()
                .rev()
                .find(|def| def.name == name)
                .map(|def| def.tokens.as_slice())
        })
    }
}

/// A reference that could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// The reference as written, e.g. `@accent`.
    pub raw: String,
    /// Why it was left in place.
    pub reason: FallbackReason,
}

/// The name of a variable reference starting at `tokens[index]`: an `@`
/// immediately followed by an identifier.
#[must_use]
pub fn variable_reference(tokens: &[Token], index: usize) -> Option<&str> {
    let at = tokens.get(index)?;
    let ident = tokens.get(index + 1)?;
    (at.is_delim('@') && ident.kind == TokenKind::Ident && at.span.end == ident.span.start)
        .then_some(ident.text.as_str())
}

/// Replace every variable reference in `tokens`.
///
/// References that cannot be resolved stay in the output as a single
/// `UNKNOWN` token holding their text, and are reported in the second
/// element of the result.
#[must_use]
pub fn substitute_variables(tokens: &[Token], scope: &VariableScope<'_>) -> (Vec<Token>, Vec<Unresolved>) {
    let mut substitution = Substitution {
        scope,
        resolving: Vec::new(),
        output: Vec::with_capacity(tokens.len()),
        unresolved: Vec::new(),
        exhausted: false,
    };
    substitution.expand(tokens);
    (substitution.output, substitution.unresolved)
}

struct Substitution<'s, 'a> {
    scope: &'s VariableScope<'a>,
    /// Names currently being expanded, innermost last
    resolving: Vec<String>,
    output: Vec<Token>,
    unresolved: Vec<Unresolved>,
    /// Set once the output reaches [`MAX_SUBSTITUTION_TOKENS`]
    exhausted: bool,
}

impl Substitution<'_, '_> {
    fn expand(&mut self, tokens: &[Token]) {
        let nested = !self.resolving.is_empty();
        let mut index = 0;
        while index < tokens.len() {
            if nested && self.exhausted {
                return;
            }
            let Some(name) = variable_reference(tokens, index) else {
                if nested && self.output.len() >= MAX_SUBSTITUTION_TOKENS {
                    self.exhausted = true;
                    return;
                }
                self.output.push(tokens[index].clone());
                index += 1;
                continue;
            };

            let span = tokens[index].span.start..tokens[index + 1].span.end;
            index += 2;

            let failure = if self.exhausted {
                Some(FallbackReason::ExpansionLimit)
            } else if self.resolving.iter().any(|active| active == name)
                || self.resolving.len() >= MAX_SUBSTITUTION_DEPTH
            {
                Some(FallbackReason::VariableCycle)
            } else if let Some(value) = self.scope.lookup(name) {
                let (output_start, unresolved_start) = (self.output.len(), self.unresolved.len());
                self.resolving.push(name.to_string());
                self.expand(value);
                let _ = self.resolving.pop();

                // Only the outermost reference is rolled back, so the
                // value keeps one placeholder for the whole expansion.
                if self.exhausted && !nested {
                    self.output.truncate(output_start);
                    self.unresolved.truncate(unresolved_start);
                    Some(FallbackReason::ExpansionLimit)
                } else {
                    None
                }
            } else {
                Some(FallbackReason::UndefinedVariable)
            };

            if let Some(reason) = failure {
                let raw = format!("@{name}");
                self.unresolved.push(Unresolved {
                    raw: raw.clone(),
                    reason,
                });
                self.output.push(Token::new(TokenKind::Unknown, raw, span));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn def(name: &str, value: &str) -> VariableDef {
        VariableDef {
            name: name.to_string(),
            tokens: tokenize(value).unwrap(),
            offset: 0,
        }
    }

    fn text(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_nested_substitution() {
        let defs = [def("base", "10px"), def("pad", "@base 2px")];
        let scope = VariableScope::new().with_frame(&defs);
        let (tokens, unresolved) = substitute_variables(&tokenize("@pad 0").unwrap(), &scope);
        assert_eq!(text(&tokens), "10px 2px 0");
        assert!(unresolved.is_empty());
    }

    #[test]
    fn test_inner_frame_shadows_outer() {
        let outer = [def("c", "red")];
        let inner = [def("c", "blue"), def("c", "green")];
        let scope = VariableScope::new().with_frame(&outer).with_frame(&inner);
        assert_eq!(text(scope.lookup("c").unwrap()), "green");
    }

    #[test]
    fn test_cycle_and_undefined() {
        let defs = [def("a", "@b"), def("b", "@a")];
        let scope = VariableScope::new().with_frame(&defs);
        let (tokens, unresolved) = substitute_variables(&tokenize("@a @nope").unwrap(), &scope);
        assert_eq!(text(&tokens), "@a @nope");
        assert_eq!(
            unresolved.iter().map(|u| u.reason).collect::<Vec<_>>(),
            [FallbackReason::VariableCycle, FallbackReason::UndefinedVariable]
        );
    }

    #[test]
    fn test_doubling_chain_stops_at_token_limit() {
        let mut defs = vec![def("v0", "x x")];
        for level in 1..=24 {
            defs.push(def(&format!("v{level}"), &format!("@v{0} @v{0}", level - 1)));
        }
        let scope = VariableScope::new().with_frame(&defs);

        let (tokens, unresolved) = substitute_variables(&tokenize("@v24 1px").unwrap(), &scope);
        assert_eq!(text(&tokens), "@v24 1px");
        assert_eq!(
            unresolved,
            [Unresolved {
                raw: "@v24".to_string(),
                reason: FallbackReason::ExpansionLimit,
            }]
        );

        // Small expansions are unaffected.
        let (tokens, unresolved) = substitute_variables(&tokenize("@v2").unwrap(), &scope);
        assert_eq!(text(&tokens), "x x x x x x x x");
        assert!(unresolved.is_empty());
    }

    #[test]
    fn test_detached_at_is_not_a_reference() {
        let tokens = tokenize("@ name").unwrap();
        assert_eq!(variable_reference(&tokens, 0), None);
    }
}
