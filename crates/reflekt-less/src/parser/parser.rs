//! Block-structure parser.
//!
//! Builds the raw rule tree: blocks keyed by selector or at-rule, each with
//! its declarations (value tokens still unresolved), variable definitions
//! and child blocks. Nesting is tracked with an explicit stack of indices
//! into an arena of blocks, so deep input cannot overflow the call stack;
//! [`ParseOptions::max_depth`] bounds it.

use std::collections::HashMap;

use super::options::ParseOptions;
use crate::error::{ParseError, ParseWarning, Result};
use crate::lexer::{Token, TokenKind, TokenStream};
use crate::stylesheet::BlockKind;
use crate::util::{IdGenerator, split_top_level_commas, trim_whitespace};
use crate::values::VariableDef;
use crate::values::substitute::variable_reference;

/// A declaration before value normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    /// Property name as written.
    pub property: String,
    /// Value tokens, trimmed, without the `!important` annotation.
    pub value: Vec<Token>,
    /// Whether the declaration ended with `!important`.
    pub important: bool,
    /// Byte offset of the property name.
    pub offset: usize,
}

/// A block in the parser's arena.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBlock {
    /// What opened the block.
    pub kind: BlockKind,
    /// Selector text, `@keyword prelude`, or a generated id.
    pub key: String,
    /// Byte offset of the `{`, or of the statement for block-less entries.
    pub offset: usize,
    /// False for `@import ...;` style at-rules and `name;` markers.
    pub has_body: bool,
    /// Declarations in source order.
    pub declarations: Vec<RawDeclaration>,
    /// `@name: value;` definitions in source order.
    pub variables: Vec<VariableDef>,
    /// Arena indices of child blocks, in source order.
    pub children: Vec<usize>,
    /// Child arena index by key, for merging repeated keys.
    child_keys: HashMap<String, usize>,
}

impl RawBlock {
    fn new(kind: BlockKind, key: String, offset: usize, has_body: bool) -> Self {
        Self {
            kind,
            key,
            offset,
            has_body,
            declarations: Vec::new(),
            variables: Vec::new(),
            children: Vec::new(),
            child_keys: HashMap::new(),
        }
    }
}

/// Parser output: the block arena (root at index 0) and the warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTree {
    /// All blocks; index 0 is the root.
    pub blocks: Vec<RawBlock>,
    /// Recoverable problems in source order.
    pub warnings: Vec<ParseWarning>,
}

impl RawTree {
    /// The root block.
    #[must_use]
    pub fn root(&self) -> &RawBlock {
        &self.blocks[Self::ROOT]
    }

    /// Arena index of the root block.
    pub const ROOT: usize = 0;
}

/// How a statement ended.
enum End {
    /// `{` at this byte offset
    Block(usize),
    Semicolon,
    /// `}` (left in the stream)
    Close,
    Eof,
}

/// LESS block parser.
pub struct Parser<'a, 'o> {
    stream: TokenStream<'a>,
    options: &'o ParseOptions,
    ids: &'o mut dyn IdGenerator,
    blocks: Vec<RawBlock>,
    /// Arena indices of the open blocks; the root is always at the bottom
    stack: Vec<usize>,
    warnings: Vec<ParseWarning>,
}

impl<'a, 'o> Parser<'a, 'o> {
    /// Create a parser over `stream`. Anonymous blocks are keyed with ids
    /// from `ids`.
    pub fn new(stream: TokenStream<'a>, options: &'o ParseOptions, ids: &'o mut dyn IdGenerator) -> Self {
        Self {
            stream,
            options,
            ids,
            blocks: vec![RawBlock::new(BlockKind::Root, String::new(), 0, true)],
            stack: vec![RawTree::ROOT],
            warnings: Vec::new(),
        }
    }

    /// Parse the whole stream.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid UTF-8, on nesting deeper than
    /// [`ParseOptions::max_depth`], and in strict mode on the first warning.
    pub fn parse(mut self) -> Result<RawTree> {
        loop {
            self.stream.skip_whitespace()?;
            let Some(token) = self.stream.peek()? else {
                break;
            };
            let offset = token.span.start;
            let close = token.is_delim('}');
            let skip = token.is_delim(';') || matches!(token.kind, TokenKind::Cdo | TokenKind::Cdc);

            if close {
                let _ = self.stream.next_token()?;
                self.close_block(offset)?;
            } else if skip {
                let _ = self.stream.next_token()?;
            } else {
                self.statement()?;
            }
        }

        // Blocks still open at EOF close implicitly, innermost first.
        while self.stack.len() > 1 {
            let Some(index) = self.stack.pop() else {
                break;
            };
            let block = &self.blocks[index];
            let warning = ParseWarning::UnterminatedBlock {
                key: block.key.clone(),
                offset: block.offset,
            };
            self.warn(warning)?;
        }

        Ok(RawTree {
            blocks: self.blocks,
            warnings: self.warnings,
        })
    }

    fn current(&self) -> usize {
        self.stack.last().copied().unwrap_or(RawTree::ROOT)
    }

    fn warn(&mut self, warning: ParseWarning) -> Result<()> {
        if self.options.strict {
            return Err(ParseError::Strict(warning).into());
        }
        self.warnings.push(warning);
        Ok(())
    }

    fn close_block(&mut self, offset: usize) -> Result<()> {
        if self.stack.len() > 1 {
            let _ = self.stack.pop();
            Ok(())
        } else {
            self.warn(ParseWarning::UnexpectedCloseBrace { offset })
        }
    }

    /// Consume one statement: a prelude followed by `{`, or a `;`-terminated
    /// declaration, variable, at-rule or marker.
    fn statement(&mut self) -> Result<()> {
        let mut tokens = Vec::new();
        let end = loop {
            if self.stream.peek()?.is_some_and(|t| t.is_delim('}')) {
                break End::Close;
            }
            let Some(token) = self.stream.next_token()? else {
                break End::Eof;
            };
            if token.is_delim('{') {
                break End::Block(token.span.start);
            }
            if token.is_delim(';') {
                break End::Semicolon;
            }
            tokens.push(token);
        };

        let tokens = trim_whitespace(&tokens);
        match end {
            End::Block(offset) => self.open_block(tokens, offset),
            End::Semicolon | End::Close | End::Eof => self.simple_statement(tokens),
        }
    }

    fn open_block(&mut self, prelude: &[Token], offset: usize) -> Result<()> {
        if self.stack.len() > self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                offset,
            }
            .into());
        }

        let (kind, key) = match at_rule_head(prelude) {
            Some((keyword, rest)) => at_rule(keyword, rest),
            None => {
                let selectors: Vec<String> = split_top_level_commas(prelude)
                    .into_iter()
                    .map(collapse_text)
                    .filter(|selector| !selector.is_empty())
                    .collect();
                if selectors.is_empty() {
                    (BlockKind::Anonymous, self.ids.next_id())
                } else {
                    let key = selectors.join(", ");
                    (BlockKind::Rule { selectors }, key)
                }
            }
        };

        let index = self.child(kind, key, offset, true);
        self.stack.push(index);
        Ok(())
    }

    /// The existing child of the current block with `key`, or a new one.
    fn child(&mut self, kind: BlockKind, key: String, offset: usize, has_body: bool) -> usize {
        let parent = self.current();
        if let Some(&index) = self.blocks[parent].child_keys.get(&key) {
            self.blocks[index].has_body |= has_body;
            return index;
        }

        let index = self.blocks.len();
        let _ = self.blocks[parent].child_keys.insert(key.clone(), index);
        self.blocks.push(RawBlock::new(kind, key, offset, has_body));
        self.blocks[parent].children.push(index);
        index
    }

    fn simple_statement(&mut self, tokens: &[Token]) -> Result<()> {
        let Some(first) = tokens.first() else {
            return Ok(());
        };
        let offset = first.span.start;

        if first.kind.is_at_keyword() {
            if let Some((keyword, rest)) = at_rule_head(tokens) {
                let (kind, key) = at_rule(keyword, rest);
                let _ = self.child(kind, key, offset, false);
            }
            return Ok(());
        }

        if let Some(name) = variable_reference(tokens, 0) {
            let rest = trim_whitespace(&tokens[2..]);
            return match rest.split_first() {
                Some((assign, value)) if assign.is_delim(':') || assign.is_delim('=') => {
                    let definition = VariableDef {
                        name: name.to_string(),
                        tokens: trim_whitespace(value).to_vec(),
                        offset,
                    };
                    let current = self.current();
                    self.blocks[current].variables.push(definition);
                    Ok(())
                }
                _ => self.warn(ParseWarning::UnknownAtRule {
                    keyword: name.to_string(),
                    offset,
                }),
            };
        }

        let Some(colon) = tokens.iter().position(|t| t.is_delim(':')) else {
            // `name;` with no value marks a nested rule with an empty body.
            let selectors: Vec<String> = split_top_level_commas(tokens)
                .into_iter()
                .map(collapse_text)
                .filter(|selector| !selector.is_empty())
                .collect();
            if !selectors.is_empty() {
                let key = selectors.join(", ");
                let _ = self.child(BlockKind::Rule { selectors }, key, offset, false);
            }
            return Ok(());
        };

        match trim_whitespace(&tokens[..colon]) {
            [name] if name.kind == TokenKind::Ident && self.stack.len() > 1 => {
                let (value, important) = split_important(trim_whitespace(&tokens[colon + 1..]));
                let declaration = RawDeclaration {
                    property: name.text.clone(),
                    value: value.to_vec(),
                    important,
                    offset,
                };
                let current = self.current();
                self.blocks[current].declarations.push(declaration);
                Ok(())
            }
            _ => self.warn(ParseWarning::MalformedDeclaration {
                text: source_text(tokens),
                offset,
            }),
        }
    }
}

/// The at-keyword of a prelude and the tokens after it.
///
/// Both the fixed at-keyword tokens (`@media`) and `@` followed by an
/// identifier (`@keyframes`, `@global`) count.
fn at_rule_head(prelude: &[Token]) -> Option<(String, &[Token])> {
    let first = prelude.first()?;
    if first.kind.is_at_keyword() {
        let keyword = first.text.get(1..).unwrap_or_default().to_ascii_lowercase();
        return Some((keyword, &prelude[1..]));
    }
    let name = variable_reference(prelude, 0)?;
    Some((name.to_ascii_lowercase(), &prelude[2..]))
}

fn at_rule(keyword: String, rest: &[Token]) -> (BlockKind, String) {
    let prelude = collapse_text(rest);
    let key = if prelude.is_empty() {
        format!("@{keyword}")
    } else {
        format!("@{keyword} {prelude}")
    };
    (BlockKind::AtRule { keyword, prelude }, key)
}

/// Strip a trailing `!important` from a value.
fn split_important(value: &[Token]) -> (&[Token], bool) {
    match value.split_last() {
        Some((last, rest)) if last.kind == TokenKind::Important => (trim_whitespace(rest), true),
        _ => (value, false),
    }
}

/// Token text with each whitespace run collapsed to one space, trimmed.
fn collapse_text(tokens: &[Token]) -> String {
    let mut text = String::new();
    for token in trim_whitespace(tokens) {
        if token.is_whitespace() {
            text.push(' ');
        } else {
            text.push_str(&token.text);
        }
    }
    text
}

fn source_text(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}
