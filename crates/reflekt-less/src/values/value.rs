//! Resolved value types.

use core::fmt;

use serde::{Serialize, Serializer};
use strum_macros::{EnumString, IntoStaticStr};

use super::color::Color;
use crate::util::escape_name;

/// The normalized form of a declaration value (or one of its components).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Value {
    /// A string literal, unquoted with escapes resolved.
    String(String),
    /// A number with an optional unit.
    Number(Number),
    /// A hex color or a color function.
    Color(Color),
    /// A `#name` that is not a hex color, stored without the `#`.
    Hash(String),
    /// An identifier, resolved through the keyword table.
    Keyword(Keyword),
    /// The target of `url(...)`, unquoted.
    Url(String),
    /// Any other function call with normalized arguments.
    Function {
        /// Function name as written.
        name: String,
        /// One value per comma-separated argument.
        args: Vec<Value>,
    },
    /// `U+0025-00FF`, `u+4??`, as written.
    UnicodeRange(String),
    /// Space-separated components.
    List(Vec<Value>),
    /// Comma-separated components.
    CommaList(Vec<Value>),
    /// Text kept as written: delimiters and anything that failed to resolve.
    Raw(String),
}

impl Value {
    /// The color this value denotes: a [`Value::Color`] or a named color
    /// keyword.
    #[must_use]
    pub const fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) | Self::Keyword(Keyword::Color { color, .. }) => Some(*color),
            _ => None,
        }
    }

    /// The number, if this is a [`Value::Number`].
    #[must_use]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(number) => Some(number),
            _ => None,
        }
    }

    /// The text of a string, URL, or raw value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) | Self::Url(text) | Self::Raw(text) => Some(text),
            _ => None,
        }
    }

    /// The keyword, if this is a [`Value::Keyword`].
    #[must_use]
    pub const fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Self::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// The identifier text of a keyword value.
    #[must_use]
    pub fn keyword_name(&self) -> Option<&str> {
        self.as_keyword().map(Keyword::name)
    }

    /// The components of a list, or the value itself as a single component.
    #[must_use]
    pub fn components(&self) -> &[Self] {
        match self {
            Self::List(items) | Self::CommaList(items) => items,
            other => core::slice::from_ref(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(text) => write_quoted(f, text),
            Self::Number(number) => number.fmt(f),
            Self::Color(color) => f.write_str(&color.to_hex_string()),
            Self::Hash(name) => write_hash(f, name),
            Self::Keyword(keyword) => f.write_str(keyword.name()),
            Self::Url(url) => {
                f.write_str("url(")?;
                write_quoted(f, url)?;
                f.write_str(")")
            }
            Self::Function { name, args } => {
                write!(f, "{name}(")?;
                write_joined(f, args, ", ")?;
                f.write_str(")")
            }
            Self::UnicodeRange(range) | Self::Raw(range) => f.write_str(range),
            Self::List(items) => write_joined(f, items, " "),
            Self::CommaList(items) => write_joined(f, items, ", "),
        }
    }
}

/// `#name`, escaped so it lexes back as the same id and never as a hex color.
fn write_hash(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let mut chars = name.chars();
    if let (Some(first), true) = (chars.next(), Color::from_hex(name).is_some()) {
        return write!(f, "#\\{:x} {}", u32::from(first), chars.as_str());
    }
    write!(f, "#{}", escape_name(name))
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value], separator: &str) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Write `text` as a double-quoted CSS string.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\a ")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// A numeric value and its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Number {
    /// The magnitude.
    pub value: f64,
    /// The unit suffix.
    pub unit: Unit,
}

impl Number {
    /// Create a number.
    #[must_use]
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// The unit of a [`Number`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    /// A bare number
    None,
    /// `%`
    Percent,
    /// `em`
    Em,
    /// `ex`
    Ex,
    /// `px`
    Px,
    /// `cm`
    Cm,
    /// `mm`
    Mm,
    /// `in`
    In,
    /// `pt`
    Pt,
    /// `pc`
    Pc,
    /// `deg`
    Deg,
    /// `rad`
    Rad,
    /// `grad`
    Grad,
    /// `ms`
    Ms,
    /// `s`
    S,
    /// `Hz`
    Hz,
    /// `kHz`
    KHz,
    /// Any other identifier suffix, as written (`rem`, `vh`, `fr`, ...).
    Other(String),
}

impl Unit {
    /// Parse a unit suffix. Known units match case-insensitively.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix.to_ascii_lowercase().as_str() {
            "" => Self::None,
            "%" => Self::Percent,
            "em" => Self::Em,
            "ex" => Self::Ex,
            "px" => Self::Px,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            "in" => Self::In,
            "pt" => Self::Pt,
            "pc" => Self::Pc,
            "deg" => Self::Deg,
            "rad" => Self::Rad,
            "grad" => Self::Grad,
            "ms" => Self::Ms,
            "s" => Self::S,
            "hz" => Self::Hz,
            "khz" => Self::KHz,
            _ => Self::Other(suffix.to_string()),
        }
    }

    /// The canonical suffix text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::Percent => "%",
            Self::Em => "em",
            Self::Ex => "ex",
            Self::Px => "px",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::In => "in",
            Self::Pt => "pt",
            Self::Pc => "pc",
            Self::Deg => "deg",
            Self::Rad => "rad",
            Self::Grad => "grad",
            Self::Ms => "ms",
            Self::S => "s",
            Self::Hz => "Hz",
            Self::KHz => "kHz",
            Self::Other(suffix) => suffix,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// CSS-wide keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GlobalKeyword {
    /// `inherit`
    Inherit,
    /// `initial`
    Initial,
    /// `unset`
    Unset,
    /// `revert`
    Revert,
}

/// An identifier value after keyword resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Keyword {
    /// `inherit`, `initial`, `unset` or `revert`.
    Global(GlobalKeyword),
    /// A named color such as `red` or `transparent`.
    Color {
        /// The name as written.
        name: String,
        /// The color it names.
        color: Color,
    },
    /// `true`/`yes` or `false`/`no`.
    Boolean {
        /// The word as written.
        name: String,
        /// Its truth value.
        value: bool,
    },
    /// Any other identifier.
    Ident(String),
}

impl Keyword {
    /// The identifier text.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Global(global) => {
                let name: &'static str = global.into();
                name
            }
            Self::Color { name, .. } | Self::Boolean { name, .. } => name,
            Self::Ident(name) => name,
        }
    }
}
