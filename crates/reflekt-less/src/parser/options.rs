//! Parser configuration.

use serde::Deserialize;

/// Default limit on block nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling a parse.
///
/// Deserializable so a host can keep them in its own config file; missing
/// fields take their defaults:
///
/// ```
/// let options: reflekt_less::ParseOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
/// assert!(options.strict);
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Fail on the first recoverable problem instead of collecting warnings.
    pub strict: bool,
    /// Deepest allowed block nesting; exceeding it is a hard error.
    pub max_depth: usize,
    /// Echo each warning to stderr (once per distinct message).
    ///
    /// Seen messages are kept process-wide; hosts that reload stylesheets
    /// call [`clear_warnings`](reflekt_common::warning::clear_warnings) on
    /// each reload so changed files report again.
    pub report_warnings: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            report_warnings: true,
        }
    }
}

impl ParseOptions {
    /// Set [`strict`](Self::strict).
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set [`max_depth`](Self::max_depth).
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set [`report_warnings`](Self::report_warnings).
    #[must_use]
    pub const fn with_report_warnings(mut self, report_warnings: bool) -> Self {
        self.report_warnings = report_warnings;
        self
    }
}
