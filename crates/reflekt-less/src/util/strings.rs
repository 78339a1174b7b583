//! String helpers: quotes, escapes, vendor prefixes and key casing.

/// Vendor prefixes recognized on property names, longest first.
pub const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// Remove one pair of matching surrounding quotes (`"…"` or `'…'`).
///
/// Text that is not fully quoted is returned unchanged.
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Resolve CSS backslash escapes.
///
/// `\` followed by up to six hex digits (and one optional whitespace) is a
/// code point, `\` before a newline is a line continuation and is dropped,
/// and `\` before anything else yields that character.
#[must_use]
pub fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            None => out.push('\\'),
            Some('\n') => {
                let _ = chars.next();
            }
            Some('\r') => {
                let _ = chars.next();
                if chars.peek() == Some(&'\n') {
                    let _ = chars.next();
                }
            }
            Some(h) if h.is_ascii_hexdigit() => {
                let mut code = 0u32;
                let mut digits = 0;
                while digits < 6 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(d) => {
                            code = code * 16 + d;
                            digits += 1;
                            let _ = chars.next();
                        }
                        None => break,
                    }
                }
                if chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                    let _ = chars.next();
                }
                let decoded = match code {
                    0 => None,
                    code => char::from_u32(code),
                };
                out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => {
                let _ = chars.next();
                out.push(other);
            }
        }
    }
    out
}

/// Escape `name` so it lexes back as a single name: the inverse of
/// [`unescape`] for `#hash` and identifier text.
///
/// Whitespace and control characters become hex escapes with a terminating
/// space; any other non-name character gets a plain backslash.
#[must_use]
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') || !c.is_ascii() {
            out.push(c);
        } else if c.is_ascii_whitespace() || c.is_ascii_control() {
            out.push_str(&format!("\\{:x} ", u32::from(c)));
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// [`strip_quotes`] then [`unescape`]: the text a string literal denotes.
#[must_use]
pub fn unquote(text: &str) -> String {
    unescape(strip_quotes(text))
}

/// Returns true if `text` starts with any of `prefixes`.
#[must_use]
pub fn has_prefix(text: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| text.starts_with(prefix))
}

/// The vendor prefix of a property name, if it has one.
#[must_use]
pub fn vendor_prefix(property: &str) -> Option<&'static str> {
    VENDOR_PREFIXES
        .iter()
        .copied()
        .find(|prefix| property.len() > prefix.len() && property.starts_with(prefix))
}

/// The property name without its vendor prefix.
#[must_use]
pub fn strip_vendor_prefix(property: &str) -> &str {
    vendor_prefix(property).map_or(property, |prefix| &property[prefix.len()..])
}

/// Application rank of a key: vendor-prefixed keys rank before plain ones,
/// so when a group is applied in rank order the plain form lands last.
#[must_use]
pub fn prefix_rank(key: &str) -> u8 {
    u8::from(vendor_prefix(key).is_none())
}

/// Order keys for application: vendor-prefixed keys first, plain keys last.
///
/// The sort is stable, so keys of the same rank keep their relative order.
#[must_use]
pub fn prefix_ordered_keys<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> Vec<S> {
    let mut keys: Vec<S> = keys.into_iter().collect();
    keys.sort_by_key(|key| prefix_rank(key.as_ref()));
    keys
}

/// `font-size` → `fontSize`.
///
/// Hyphens are removed and the letter after each one is upper-cased. Empty
/// segments (leading or doubled hyphens) are skipped.
#[must_use]
pub fn to_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split('-').filter(|segment| !segment.is_empty()) {
        if out.is_empty() {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
