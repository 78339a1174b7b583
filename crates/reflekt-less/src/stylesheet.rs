//! The resolved stylesheet: the output handed to the host.

use core::fmt;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::NormalizationFallback;
use crate::parser::{RawBlock, RawTree};
use crate::values::normalize::resolve_declarations;
use crate::values::{Value, VariableDef, VariableScope, resolve_value};

/// Variables defined inside `@global { ... }` are visible everywhere.
const GLOBAL_AT_RULE: &str = "global";

/// What opened a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    /// The implicit top-level block. Never appears in a [`Stylesheet`].
    Root,
    /// A selector list.
    Rule {
        /// The selectors, whitespace-collapsed.
        selectors: Vec<String>,
    },
    /// `@keyword prelude`.
    AtRule {
        /// Lower-cased keyword without `@`.
        keyword: String,
        /// Prelude text, whitespace-collapsed; may be empty.
        prelude: String,
    },
    /// `{ ... }` with no selector.
    Anonymous,
}

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    /// Property name as written (the winning member of its group).
    pub property: String,
    /// Logical key: vendor prefix removed, camelCased.
    pub key: String,
    /// Resolved value.
    pub value: Value,
    /// `!important`.
    pub important: bool,
}

/// A resolved block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Selector text, `@keyword prelude`, or a generated id.
    pub key: String,
    /// Position among its siblings in source order.
    pub order: usize,
    /// What opened the block.
    pub kind: BlockKind,
    /// Declarations in source order, one per logical key.
    pub declarations: Vec<Declaration>,
    /// Child blocks in source order.
    pub nested: Vec<Block>,
    /// False for block-less at-rules and `name;` markers.
    pub has_body: bool,
}

impl Block {
    /// The value for a logical key such as `fontSize`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.declaration(key).map(|declaration| &declaration.value)
    }

    /// The declaration for a logical key.
    #[must_use]
    pub fn declaration(&self, key: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|declaration| declaration.key == key)
    }

    /// Whether the declaration for `key` is `!important`.
    #[must_use]
    pub fn is_important(&self, key: &str) -> bool {
        self.declaration(key).is_some_and(|declaration| declaration.important)
    }

    /// A direct child block by key.
    #[must_use]
    pub fn nested_block(&self, key: &str) -> Option<&Self> {
        self.nested.iter().find(|block| block.key == key)
    }

    /// True for `name;` markers and block-less at-rules such as `@import`.
    #[must_use]
    pub const fn is_empty_marker(&self) -> bool {
        !self.has_body
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        let header = match self.kind {
            BlockKind::Anonymous => "",
            _ => self.key.as_str(),
        };

        if !self.has_body {
            return writeln!(f, "{indent}{header};");
        }

        if header.is_empty() {
            writeln!(f, "{indent}{{")?;
        } else {
            writeln!(f, "{indent}{header} {{")?;
        }
        for declaration in &self.declarations {
            write!(f, "{indent}  {}: {}", declaration.property, declaration.value)?;
            if declaration.important {
                f.write_str(" !important")?;
            }
            f.write_str(";\n")?;
        }
        for block in &self.nested {
            block.write_indented(f, depth + 1)?;
        }
        writeln!(f, "{indent}}}")
    }
}

/// A parsed and normalized stylesheet.
///
/// Built once per parse; every accessor returns shared references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stylesheet {
    blocks: Vec<Block>,
    variables: BTreeMap<String, Value>,
    /// Position in `blocks` by key; keys are unique per level.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Stylesheet {
    /// A top-level block by key (`.btn`, `@media screen`, a generated id).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Block> {
        self.index.get(key).and_then(|&position| self.blocks.get(position))
    }

    /// Top-level blocks in source order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Global variables (top level and `@global`), resolved.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    /// A global variable by name, without the `@`.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Number of top-level blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when there are no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block, depth-first in source order.
    pub fn walk(&self) -> impl Iterator<Item = &Block> {
        Walk {
            stack: self.blocks.iter().rev().collect(),
        }
    }

    /// Every declaration of every block, in document order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.walk().flat_map(|block| block.declarations.iter())
    }

    /// Resolve a raw tree. Value fallbacks are appended to `fallbacks`.
    pub(crate) fn from_tree(tree: &RawTree, fallbacks: &mut Vec<NormalizationFallback>) -> Self {
        let root = tree.root();

        let mut globals: Vec<VariableDef> = root.variables.clone();
        for &index in &root.children {
            let block = &tree.blocks[index];
            if matches!(&block.kind, BlockKind::AtRule { keyword, .. } if keyword == GLOBAL_AT_RULE) {
                globals.extend(block.variables.iter().cloned());
            }
        }
        globals.sort_by_key(|def| def.offset);

        let scope = VariableScope::new().with_frame(&globals);
        let mut variables = BTreeMap::new();
        for def in &globals {
            if variables.contains_key(&def.name) {
                continue;
            }
            if let Some(tokens) = scope.lookup(&def.name) {
                let value = resolve_value(&format!("@{}", def.name), tokens, &scope, fallbacks);
                let _ = variables.insert(def.name.clone(), value);
            }
        }

        let blocks = build_children(tree, root, &scope, fallbacks);
        let index = blocks
            .iter()
            .enumerate()
            .map(|(position, block)| (block.key.clone(), position))
            .collect();
        Self {
            blocks,
            variables,
            index,
        }
    }
}

fn build_children(
    tree: &RawTree,
    parent: &RawBlock,
    scope: &VariableScope<'_>,
    fallbacks: &mut Vec<NormalizationFallback>,
) -> Vec<Block> {
    parent
        .children
        .iter()
        .enumerate()
        .map(|(order, &index)| {
            let raw = &tree.blocks[index];
            let scope = scope.with_frame(&raw.variables);
            Block {
                key: raw.key.clone(),
                order,
                kind: raw.kind.clone(),
                declarations: resolve_declarations(&raw.declarations, &scope, fallbacks),
                nested: build_children(tree, raw, &scope, fallbacks),
                has_body: raw.has_body,
            }
        })
        .collect()
}

struct Walk<'a> {
    stack: Vec<&'a Block>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.stack.pop()?;
        self.stack.extend(block.nested.iter().rev());
        Some(block)
    }
}

impl fmt::Display for Stylesheet {
    /// Canonical LESS text; parsing it again yields an equivalent stylesheet.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.variables {
            writeln!(f, "@{name}: {value};")?;
        }
        for block in &self.blocks {
            block.write_indented(f, 0)?;
        }
        Ok(())
    }
}
