//! Stylesheet loading with `@import` inlining.
//!
//! `@import "file.less";` and `@import url(file.less);` at the top level are
//! replaced by the imported file's contents, resolved relative to the
//! importing file. A file imported twice is inlined once; an import cycle
//! is an error.

use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use reflekt_less::{Token, TokenKind, Value, tokenize, values::normalize_value};

/// Extension added to import targets written without one.
const DEFAULT_EXTENSION: &str = "less";

/// Load `path` with its imports inlined recursively.
pub fn load_with_imports(path: &Path) -> Result<String> {
    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    load_recursive(path, &mut visited, &mut stack)
}

fn load_recursive(path: &Path, visited: &mut HashSet<PathBuf>, stack: &mut Vec<PathBuf>) -> Result<String> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", path.display()))?;

    if stack.contains(&canonical) {
        bail!("recursive import detected: {}", canonical.display());
    }
    if !visited.insert(canonical.clone()) {
        return Ok(String::new());
    }

    let source = fs::read_to_string(&canonical)
        .with_context(|| format!("failed to read {}", canonical.display()))?;
    let tokens = tokenize(&source).with_context(|| format!("failed to lex {}", canonical.display()))?;
    let base = canonical.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    stack.push(canonical);
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    for import in find_imports(&tokens) {
        out.push_str(&source[copied..import.span.start]);
        let target = resolve_target(&base, &import.target);
        out.push_str(&load_recursive(&target, visited, stack)?);
        out.push('\n');
        copied = import.span.end;
    }
    out.push_str(&source[copied..]);
    let _ = stack.pop();

    Ok(out)
}

fn resolve_target(base: &Path, target: &str) -> PathBuf {
    let path = base.join(target);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

/// A top-level `@import <target>;` statement.
#[derive(Debug, PartialEq, Eq)]
struct Import {
    /// Byte range from `@import` through `;`
    span: Range<usize>,
    target: String,
}

/// Find the inlinable imports outside any block.
///
/// Imports with a media list (`@import "print.less" print;`) are left for
/// the parser, which keeps them as block-less at-rules.
fn find_imports(tokens: &[Token]) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        if token.is_delim('{') {
            depth += 1;
        } else if token.is_delim('}') {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.kind == TokenKind::Import {
            if let Some(import) = import_at(tokens, index) {
                imports.push(import);
            }
        }
    }
    imports
}

fn import_at(tokens: &[Token], index: usize) -> Option<Import> {
    let mut rest = tokens[index + 1..].iter().filter(|token| !token.is_whitespace());
    let target = rest.next()?;
    let end = rest.next()?;
    if !end.is_delim(';') {
        return None;
    }

    let target = match target.kind {
        TokenKind::String | TokenKind::Uri => match normalize_value(&target.text) {
            Value::String(path) | Value::Url(path) => path,
            _ => return None,
        },
        _ => return None,
    };
    Some(Import {
        span: tokens[index].span.start..end.span.end,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A fresh directory under the system temp dir with the given files.
    fn fixture(files: &[(&str, &str)]) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "reflekt-loader-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        for (name, contents) in files {
            fs::write(dir.join(name), contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_find_imports() {
        let tokens = tokenize("@import \"a.less\";\n.x { @import 'b'; }\n@import url(c.less);\n@import \"d\" print;").unwrap();
        let targets: Vec<String> = find_imports(&tokens).into_iter().map(|i| i.target).collect();
        assert_eq!(targets, ["a.less", "c.less"]);
    }

    #[test]
    fn test_inline_nested_imports_once() {
        let dir = fixture(&[
            ("main.less", "@import \"colors\";\n@import 'colors.less';\n.b { color: @red; }\n"),
            ("colors.less", "@import url(base.less);\n@red: #f00;\n"),
            ("base.less", ".a { margin: 0; }\n"),
        ]);
        let combined = load_with_imports(&dir.join("main.less")).unwrap();
        assert_eq!(combined.matches(".a {").count(), 1);
        assert_eq!(combined.matches("@red:").count(), 1);
        assert!(combined.contains(".b { color: @red; }"));
        assert!(!combined.contains("@import"));
    }

    #[test]
    fn test_detect_cycles() {
        let dir = fixture(&[("a.less", "@import \"b.less\";"), ("b.less", "@import \"a.less\";")]);
        let err = load_with_imports(&dir.join("a.less")).unwrap_err();
        assert!(err.to_string().contains("recursive import detected"));
    }

    #[test]
    fn test_missing_file() {
        let dir = fixture(&[("a.less", "@import \"missing.less\";")]);
        let err = load_with_imports(&dir.join("a.less")).unwrap_err();
        assert!(err.to_string().contains("failed to resolve"));
    }
}
